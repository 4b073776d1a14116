//! Message composition and the Gmail `raw` payload.

use crate::error::{Error, Result};
use maillist_mime::MessageBuilder;
use maillist_mime::encoding::{decode_base64url, encode_base64url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// `text/plain`.
    #[default]
    Plain,
    /// `text/html`.
    Html,
}

impl BodyKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Plain, Self::Html];

    /// Returns the MIME subtype.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "plain" => Ok(Self::Plain),
            "html" => Ok(Self::Html),
            other => Err(Error::InvalidBodyKind(other.to_string())),
        }
    }
}

/// A base64url-encoded RFC 5322 message, as the send endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Encoded message.
    pub raw: String,
}

impl RawMessage {
    /// Decodes the payload back to message text.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64url or UTF-8.
    pub fn decode(&self) -> Result<String> {
        let bytes = decode_base64url(&self.raw)?;
        Ok(String::from_utf8(bytes).map_err(maillist_mime::Error::from)?)
    }
}

/// Renders one message into a send payload.
///
/// Output depends only on the arguments: no `Date` or `Message-ID` is added,
/// the API stamps those on delivery.
///
/// # Errors
///
/// Returns an error if a header contains a line break.
pub fn build(
    recipient: &str,
    sender: &str,
    subject: &str,
    body: &str,
    body_kind: BodyKind,
) -> Result<RawMessage> {
    let builder = MessageBuilder::new()
        .to(recipient)
        .from(sender)
        .subject(subject);
    let builder = match body_kind {
        BodyKind::Plain => builder.text_body(body),
        BodyKind::Html => builder.html_body(body),
    };
    let message = builder.build()?;

    Ok(RawMessage {
        raw: encode_base64url(&message.to_bytes()),
    })
}

/// A mutable message template plus its last rendered payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Body content type.
    pub body_kind: BodyKind,
    payload: Option<RawMessage>,
}

impl Message {
    /// Sets every field and renders the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be rendered.
    pub fn create(
        to: impl Into<String>,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        body_kind: BodyKind,
    ) -> Result<Self> {
        let mut message = Self {
            to: to.into(),
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            body_kind,
            payload: None,
        };
        message.recreate()?;
        Ok(message)
    }

    /// Re-renders the payload from the current fields.
    ///
    /// On failure the previous payload is dropped, so a stale payload is
    /// never sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be rendered.
    pub fn recreate(&mut self) -> Result<&RawMessage> {
        self.payload = None;
        let payload = build(
            &self.to,
            &self.sender,
            &self.subject,
            &self.body,
            self.body_kind,
        )?;
        Ok(self.payload.insert(payload))
    }

    /// Returns the last rendered payload.
    #[must_use]
    pub const fn payload(&self) -> Option<&RawMessage> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_body_kind_from_str() {
        assert_eq!("plain".parse::<BodyKind>().unwrap(), BodyKind::Plain);
        assert_eq!(" html ".parse::<BodyKind>().unwrap(), BodyKind::Html);
        assert!(matches!(
            "markdown".parse::<BodyKind>(),
            Err(Error::InvalidBodyKind(kind)) if kind == "markdown"
        ));
        assert!("".parse::<BodyKind>().is_err());
    }

    #[test]
    fn test_build_plain() {
        let raw = build("a@x.com", "me@x.com", "Hi", "Test", BodyKind::Plain).unwrap();
        assert!(!raw.raw.contains(['+', '/']));

        let text = raw.decode().unwrap();
        assert_eq!(
            text,
            "To: a@x.com\r\nFrom: me@x.com\r\nSubject: Hi\r\nMIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\nContent-Transfer-Encoding: 7bit\r\n\r\nTest"
        );
    }

    #[test]
    fn test_build_html_non_ascii() {
        let raw = build(
            "a@x.com",
            "me@x.com",
            "Grüße",
            "<p>héllo</p>",
            BodyKind::Html,
        )
        .unwrap();
        let parsed = maillist_mime::Message::parse(&raw.decode().unwrap()).unwrap();

        assert_eq!(parsed.subject().unwrap(), "Grüße");
        assert!(parsed.content_type().unwrap().to_string().starts_with("text/html"));
        assert_eq!(parsed.body_text().unwrap(), "<p>héllo</p>");
    }

    #[test]
    fn test_build_rejects_header_injection() {
        let result = build("a@x.com\r\nBcc: evil@x.com", "me", "Hi", "b", BodyKind::Plain);
        assert!(matches!(result, Err(Error::Mime(_))));
    }

    #[test]
    fn test_recreate_follows_fields() {
        let mut message =
            Message::create("a@x.com", "me", "Hi", "Test", BodyKind::Plain).unwrap();
        let first = message.payload().cloned().unwrap();

        message.to = "b@x.com".to_string();
        let second = message.recreate().unwrap().clone();

        assert_ne!(first, second);
        assert!(second.decode().unwrap().starts_with("To: b@x.com\r\n"));
        assert_eq!(message.payload(), Some(&second));
    }

    #[test]
    fn test_failed_recreate_clears_payload() {
        let mut message = Message::create("a@x.com", "me", "Hi", "Test", BodyKind::Plain).unwrap();
        message.to = "bad\naddress".to_string();

        assert!(message.recreate().is_err());
        assert!(message.payload().is_none());
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(
            to in "[a-z]{1,10}@[a-z]{1,10}\\.com",
            subject in "[^\r\n]{0,40}",
            body in "\\PC{0,200}",
            html in any::<bool>(),
        ) {
            let kind = if html { BodyKind::Html } else { BodyKind::Plain };
            let first = build(&to, "me", &subject, &body, kind).unwrap();
            let second = build(&to, "me", &subject, &body, kind).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
