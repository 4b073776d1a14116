//! Error types for the core library.

use crate::gmail::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The client registration file is missing.
    #[error("Client credentials not found at {}", .0.display())]
    ConfigurationMissing(PathBuf),

    /// The user never completed the consent screen.
    #[error("Authorization incomplete: {0}")]
    AuthorizationIncomplete(String),

    /// Gmail API call failed.
    #[error("Gmail API error: {0}")]
    Api(#[from] ApiError),

    /// Subject, body or recipients left empty.
    #[error("Subject, body and recipients are all required")]
    FormIncomplete,

    /// Body kind other than `plain` or `html`.
    #[error("Invalid body kind: {0:?} (expected \"plain\" or \"html\")")]
    InvalidBodyKind(String),

    /// `OAuth2` operation failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] maillist_oauth::Error),

    /// Message could not be built.
    #[error("MIME error: {0}")]
    Mime(#[from] maillist_mime::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
