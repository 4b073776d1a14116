//! Single-message sending that reports instead of failing.

use crate::compose::Message;
use crate::gmail::{ApiError, MailApi, ME, Receipt};
use std::fmt;
use tracing::{debug, warn};

/// Why a message was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendFailure {
    /// No API client yet.
    #[error("not authorized")]
    NotAuthorized,

    /// The message has no rendered payload.
    #[error("no message to send")]
    NoPayload,

    /// The payload could not be rendered for this recipient.
    #[error("{0}")]
    Build(String),

    /// The API rejected the call.
    #[error("{0}")]
    Api(#[from] ApiError),
}

/// Result of sending to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Recipient the message was addressed to.
    pub recipient: String,
    /// Receipt on success.
    pub result: Result<Receipt, SendFailure>,
}

impl SendOutcome {
    /// Returns true if the API accepted the message.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Short status: `done` or `Error! <detail>`.
    #[must_use]
    pub fn status(&self) -> String {
        match &self.result {
            Ok(_) => "done".to_string(),
            Err(e) => format!("Error! {e}"),
        }
    }
}

/// Renders the console progress line.
impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Just gonna send it to {} . . . {}",
            self.recipient,
            self.status()
        )
    }
}

/// Sends a [`Message`] through an optional API client.
#[derive(Debug, Clone)]
pub struct Emailer<C> {
    client: Option<C>,
    /// Message template; mutate it and call [`Message::recreate`] before sending.
    pub message: Message,
}

impl<C: MailApi> Emailer<C> {
    /// Creates an emailer. A `None` client makes every send fail with
    /// [`SendFailure::NotAuthorized`].
    #[must_use]
    pub const fn new(client: Option<C>, message: Message) -> Self {
        Self { client, message }
    }

    /// Returns the API client, if authorized.
    #[must_use]
    pub const fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// Sends the current payload as the authorized user.
    ///
    /// Never fails: every problem is folded into the returned outcome.
    pub async fn send(&self) -> SendOutcome {
        let recipient = self.message.to.clone();

        let result = match (&self.client, self.message.payload()) {
            (None, _) => Err(SendFailure::NotAuthorized),
            (_, None) => Err(SendFailure::NoPayload),
            (Some(client), Some(payload)) => client.send(ME, payload).await.map_err(Into::into),
        };

        match &result {
            Ok(receipt) => debug!(%recipient, id = %receipt.id, "Message sent"),
            Err(e) => warn!(%recipient, "Send failed: {e}"),
        }

        SendOutcome { recipient, result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compose::{BodyKind, RawMessage};
    use crate::gmail::Profile;

    #[derive(Debug)]
    struct Rejecting;

    impl MailApi for Rejecting {
        async fn get_profile(&self) -> Result<Profile, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }

        async fn send(&self, user_id: &str, _: &RawMessage) -> Result<Receipt, ApiError> {
            assert_eq!(user_id, "me");
            Err(ApiError::Service {
                status: 403,
                message: "Insufficient Permission".into(),
            })
        }
    }

    fn message() -> Message {
        Message::create("a@x.com", "me@x.com", "Hi", "Test", BodyKind::Plain).unwrap()
    }

    #[tokio::test]
    async fn test_without_client() {
        let emailer: Emailer<Rejecting> = Emailer::new(None, message());
        let outcome = emailer.send().await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.result, Err(SendFailure::NotAuthorized));
        assert_eq!(
            outcome.to_string(),
            "Just gonna send it to a@x.com . . . Error! not authorized"
        );
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let emailer = Emailer::new(Some(Rejecting), message());
        let outcome = emailer.send().await;

        assert_eq!(outcome.recipient, "a@x.com");
        assert_eq!(
            outcome.status(),
            "Error! Insufficient Permission (HTTP 403)"
        );
    }

    #[test]
    fn test_success_status() {
        let outcome = SendOutcome {
            recipient: "b@x.com".into(),
            result: Ok(Receipt {
                id: "1".into(),
                thread_id: "1".into(),
                label_ids: vec![],
            }),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.to_string(), "Just gonna send it to b@x.com . . . done");
    }
}
