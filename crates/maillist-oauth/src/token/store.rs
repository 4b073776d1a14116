//! On-disk token cache.

use super::Token;
use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persists a [`Token`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path an invalidated token is moved to.
    ///
    /// `token.json` becomes `token-old.json`.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "token".into(), |s| s.to_string_lossy());
        let name = match self.path.extension() {
            Some(ext) => format!("{stem}-old.{}", ext.to_string_lossy()),
            None => format!("{stem}-old"),
        };
        self.path.with_file_name(name)
    }

    /// Loads the cached token.
    ///
    /// A missing or unreadable cache is not an error; the caller simply has
    /// to log in again.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than a missing file.
    pub async fn load(&self) -> Result<Option<Token>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(token) => {
                debug!("Loaded cached token from {}", self.path.display());
                Ok(Some(token))
            }
            Err(e) => {
                warn!("Ignoring corrupt token cache {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    /// Writes the token, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }

    /// Moves the cached token aside so the next login starts from scratch.
    ///
    /// Returns the archive path, or `None` if there was nothing to move.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails for a reason other than a missing
    /// file.
    pub async fn invalidate(&self) -> Result<Option<PathBuf>> {
        let archive = self.archive_path();
        match tokio::fs::rename(&self.path, &archive).await {
            Ok(()) => {
                debug!("Moved {} to {}", self.path.display(), archive.display());
                Ok(Some(archive))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No token to invalidate at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
