//! Sending one template to many recipients, one at a time.

use crate::gmail::MailApi;
use crate::sender::{Emailer, SendFailure, SendOutcome};
use tracing::info;

/// Totals for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Messages the API accepted.
    pub sent: usize,
    /// Messages that failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Number of recipients processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.sent + self.failed
    }
}

/// Splits a newline-separated recipient list, trimming each line and
/// skipping blank ones.
#[must_use]
pub fn parse_recipients(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sends the emailer's message to every recipient in order.
///
/// For each recipient the template is readdressed and re-rendered before the
/// call, then `on_outcome` gets the result. A failure never stops the batch.
pub async fn send_batch<C, I, F>(
    emailer: &mut Emailer<C>,
    recipients: I,
    mut on_outcome: F,
) -> BatchSummary
where
    C: MailApi,
    I: IntoIterator,
    I::Item: Into<String>,
    F: FnMut(SendOutcome),
{
    let mut summary = BatchSummary::default();

    for recipient in recipients {
        emailer.message.to = recipient.into();

        let outcome = match emailer.message.recreate() {
            Ok(_) => emailer.send().await,
            Err(e) => SendOutcome {
                recipient: emailer.message.to.clone(),
                result: Err(SendFailure::Build(e.to_string())),
            },
        };

        if outcome.is_success() {
            summary.sent += 1;
        } else {
            summary.failed += 1;
        }
        on_outcome(outcome);
    }

    info!(
        sent = summary.sent,
        failed = summary.failed,
        "Batch finished"
    );
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compose::{BodyKind, Message, RawMessage};
    use crate::gmail::{ApiError, Profile, Receipt};
    use std::sync::Mutex;

    /// Records the `To` line of every payload and fails for `fail@` addresses.
    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl MailApi for Recorder {
        async fn get_profile(&self) -> Result<Profile, ApiError> {
            Err(ApiError::Transport("unused".into()))
        }

        async fn send(&self, _: &str, message: &RawMessage) -> Result<Receipt, ApiError> {
            let text = message.decode().unwrap();
            let to = text.lines().next().unwrap().trim_start_matches("To: ").to_string();
            self.seen.lock().unwrap().push(to.clone());

            if to.starts_with("fail@") {
                return Err(ApiError::Service {
                    status: 400,
                    message: "Invalid To header".into(),
                });
            }
            Ok(Receipt {
                id: format!("id-{to}"),
                thread_id: String::new(),
                label_ids: vec!["SENT".into()],
            })
        }
    }

    fn emailer() -> Emailer<Recorder> {
        let message = Message::create("first@x.com", "me", "Hi", "Test", BodyKind::Plain).unwrap();
        Emailer::new(Some(Recorder::default()), message)
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients("a@x.com\n\n  b@x.com \r\n\t\n"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        assert!(parse_recipients(" \n ").is_empty());
    }

    #[tokio::test]
    async fn test_outcomes_in_order() {
        let mut emailer = emailer();
        let mut outcomes = Vec::new();

        let summary = send_batch(&mut emailer, ["a@x.com", "b@x.com"], |o| outcomes.push(o)).await;

        assert_eq!(summary, BatchSummary { sent: 2, failed: 0 });
        let lines: Vec<_> = outcomes.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "Just gonna send it to a@x.com . . . done",
                "Just gonna send it to b@x.com . . . done",
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let mut emailer = emailer();
        let mut outcomes = Vec::new();

        let summary = send_batch(
            &mut emailer,
            vec!["a@x.com", "fail@x.com", "c@x.com"],
            |o| outcomes.push(o),
        )
        .await;

        assert_eq!(summary, BatchSummary { sent: 2, failed: 1 });
        assert_eq!(summary.total(), 3);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].recipient, "fail@x.com");
        assert_eq!(outcomes[1].status(), "Error! Invalid To header (HTTP 400)");
        assert!(outcomes[2].is_success());

        // Every payload was re-rendered for its own recipient
        let seen = emailer_seen(&emailer);
        assert_eq!(seen, vec!["a@x.com", "fail@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn test_unrenderable_recipient() {
        let mut emailer = emailer();
        let mut outcomes = Vec::new();

        let summary =
            send_batch(&mut emailer, ["bad\naddress", "b@x.com"], |o| outcomes.push(o)).await;

        assert_eq!(summary, BatchSummary { sent: 1, failed: 1 });
        assert!(matches!(outcomes[0].result, Err(SendFailure::Build(_))));
        assert_eq!(emailer_seen(&emailer), vec!["b@x.com"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut emailer = emailer();
        let summary = send_batch(&mut emailer, Vec::<String>::new(), |_| {}).await;
        assert_eq!(summary.total(), 0);
    }

    fn emailer_seen(emailer: &Emailer<Recorder>) -> Vec<String> {
        emailer.client().unwrap().seen.lock().unwrap().clone()
    }
}
