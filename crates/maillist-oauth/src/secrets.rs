//! Client registration file (`credentials.json`) as downloaded from the
//! Google Cloud console.

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::provider::Provider;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Installed-application client registration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    /// Client ID.
    pub client_id: String,
    /// Client secret (Google issues one even for desktop apps).
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Authorization endpoint.
    #[serde(default)]
    pub auth_uri: Option<String>,
    /// Token endpoint.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Registered redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// The file wraps the registration in an `installed` or `web` object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SecretsFile {
    Installed(ClientSecrets),
    Web(ClientSecrets),
}

impl ClientSecrets {
    /// Parses the contents of a client secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the client id is empty.
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(contents)?;
        let (SecretsFile::Installed(secrets) | SecretsFile::Web(secrets)) = file;

        if secrets.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("client_id is empty".into()));
        }

        Ok(secrets)
    }

    /// Reads a client secrets file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SecretsNotFound`] if the file does not exist, or a
    /// parse error if it is malformed.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SecretsNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded client secrets from {}", path.display());
        Self::from_json(&contents)
    }

    /// Builds a provider, overriding Google's default endpoints with the
    /// ones from the file when present.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid.
    pub fn provider(&self) -> Result<Provider> {
        let google = Provider::google()?;
        let auth_url = self.auth_uri.as_deref().unwrap_or(google.auth_url.as_str());
        let token_url = self
            .token_uri
            .as_deref()
            .unwrap_or(google.token_url.as_str());

        let provider = Provider::new(google.name.clone(), auth_url, token_url)?
            .with_default_scopes(google.default_scopes);
        provider.validate()?;
        Ok(provider)
    }

    /// Builds an `OAuth2` client for this registration.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid.
    pub fn client(&self) -> Result<OAuthClient> {
        let mut client = OAuthClient::new(&self.client_id, self.provider()?);
        if let Some(secret) = &self.client_secret {
            client = client.with_client_secret(secret);
        }
        Ok(client)
    }
}
