//! Gmail REST API access.
//!
//! Only the two calls the sender needs are modelled: reading the account
//! profile and sending a raw message.

mod client;

pub use client::GmailClient;

use crate::compose::RawMessage;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;

/// User id that refers to the authorized account.
pub const ME: &str = "me";

/// Errors returned by [`MailApi`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with an error status.
    #[error("{message} (HTTP {status})")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the raw body.
        message: String,
    },
}

impl ApiError {
    /// Builds a service error from a response status and body.
    ///
    /// Google APIs answer with `{"error": {"code", "message", "status"}}`;
    /// anything else is kept verbatim.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Detail,
        }

        #[derive(Deserialize)]
        struct Detail {
            message: String,
        }

        let message = serde_json::from_str::<Envelope>(body).map_or_else(
            |_| body.trim().to_string(),
            |envelope| envelope.error.message,
        );
        Self::Service { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Account profile returned by `users.getProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Account address.
    pub email_address: String,
    /// Total messages in the mailbox.
    #[serde(default)]
    pub messages_total: u64,
    /// Total threads in the mailbox.
    #[serde(default)]
    pub threads_total: u64,
    /// Current history record id.
    #[serde(default)]
    pub history_id: String,
}

/// Confirmation returned by `users.messages.send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Message id.
    pub id: String,
    /// Thread id.
    #[serde(default)]
    pub thread_id: String,
    /// Labels applied to the sent message.
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// The subset of the Gmail API used for sending.
pub trait MailApi: Debug + Send + Sync {
    /// Fetches the authorized account's profile.
    fn get_profile(&self) -> impl Future<Output = Result<Profile, ApiError>> + Send;

    /// Sends a raw message on behalf of `user_id`.
    fn send(
        &self,
        user_id: &str,
        message: &RawMessage,
    ) -> impl Future<Output = Result<Receipt, ApiError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_google_body() {
        let body = r#"{"error": {"code": 400, "message": "Invalid To header", "status": "INVALID_ARGUMENT"}}"#;
        let error = ApiError::from_response(400, body);
        assert_eq!(
            error,
            ApiError::Service {
                status: 400,
                message: "Invalid To header".to_string()
            }
        );
        assert_eq!(error.to_string(), "Invalid To header (HTTP 400)");
    }

    #[test]
    fn test_error_from_plain_body() {
        let error = ApiError::from_response(502, "Bad Gateway\n");
        assert!(matches!(error, ApiError::Service { status: 502, message } if message == "Bad Gateway"));
    }

    #[test]
    fn test_profile_json() {
        let profile: Profile = serde_json::from_str(
            r#"{"emailAddress": "me@x.com", "messagesTotal": 12, "threadsTotal": 7, "historyId": "99"}"#,
        )
        .unwrap();
        assert_eq!(profile.email_address, "me@x.com");
        assert_eq!(profile.messages_total, 12);
        assert_eq!(profile.history_id, "99");
    }

    #[test]
    fn test_receipt_json() {
        let receipt: Receipt =
            serde_json::from_str(r#"{"id": "m1", "threadId": "t1", "labelIds": ["SENT"]}"#).unwrap();
        assert_eq!(receipt.thread_id, "t1");
        assert_eq!(receipt.label_ids, vec!["SENT".to_string()]);
    }
}
