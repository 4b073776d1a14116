//! Persistent application settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Application directory name under the platform config dir.
pub const APP_DIR: &str = "maillist";

/// Interface theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Dark palette.
    #[default]
    Dark,
    /// Light palette.
    Light,
    /// Toolkit default palette.
    Default,
}

impl ThemeName {
    /// Next theme in the dark, light, default cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Default,
            Self::Default => Self::Dark,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings stored in `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Client registration file downloaded from the Google console.
    pub credentials_path: PathBuf,
    /// Cached token file.
    pub token_path: PathBuf,
    /// Interface theme.
    pub theme: ThemeName,
    /// Worker pool size; `None` uses the available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,
    /// Seconds to wait for the browser login to complete.
    pub login_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let dir = config_dir();
        Self {
            credentials_path: dir.join("credentials.json"),
            token_path: dir.join("token.json"),
            theme: ThemeName::default(),
            pool_size: None,
            login_timeout_secs: 300,
        }
    }
}

/// Returns `<config dir>/maillist`, falling back to the working directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Settings {
    /// Default settings file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Login timeout as a duration.
    #[must_use]
    pub const fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// Loads settings from the default location.
    ///
    /// # Errors
    ///
    /// See [`Settings::load_from`].
    pub async fn load() -> Result<Self> {
        Self::load_from(Self::default_path()).await
    }

    /// Loads settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Saves settings to the default location.
    ///
    /// # Errors
    ///
    /// See [`Settings::save_to`].
    pub async fn save(&self) -> Result<()> {
        self.save_to(Self::default_path()).await
    }

    /// Saves settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        info!("Settings saved to {:?}", path);
        Ok(())
    }
}
