//! Single-part MIME message structure and handling.

use crate::content_type::ContentType;
use crate::encoding::decode_base64;
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// Single-part MIME message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Encoded body, exactly as it goes on the wire.
    pub body: String,
}

impl Message {
    /// Creates a message from headers and an already encoded body.
    #[must_use]
    pub const fn new(headers: Headers, body: String) -> Self {
        Self { headers, body }
    }

    /// Parses a raw RFC 5322 message.
    ///
    /// # Errors
    ///
    /// Returns an error if the header block is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let (head, body) = raw
            .split_once("\r\n\r\n")
            .or_else(|| raw.split_once("\n\n"))
            .unwrap_or((raw, ""));

        Ok(Self::new(Headers::parse(head)?, body.to_string()))
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the decoded Subject header.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is missing or badly encoded.
    pub fn subject(&self) -> Result<String> {
        let raw = self
            .headers
            .get("subject")
            .ok_or_else(|| Error::MissingHeader("Subject".to_string()))?;
        Headers::decode_value(raw)
    }

    /// Gets the body decoded according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => {
                // Remove line breaks for lenient parsing
                let cleaned: String = self.body.chars().filter(|c| !c.is_whitespace()).collect();
                String::from_utf8(decode_base64(&cleaned)?).map_err(Into::into)
            }
            TransferEncoding::SevenBit | TransferEncoding::EightBit => Ok(self.body.clone()),
        }
    }

    /// Renders the message to bytes suitable for transport.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}", self.headers, self.body)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::parse(" Base64 "), TransferEncoding::Base64);
        assert_eq!(TransferEncoding::parse("unknown"), TransferEncoding::SevenBit);
    }

    #[test]
    fn test_message_parse() {
        let raw = concat!(
            "To: recipient@example.com\r\n",
            "From: sender@example.com\r\n",
            "Subject: Test\r\n",
            "\r\n",
            "Hello, World!"
        );
        let message = Message::parse(raw).unwrap();

        assert_eq!(message.from(), Some("sender@example.com"));
        assert_eq!(message.to(), Some("recipient@example.com"));
        assert_eq!(message.subject().unwrap(), "Test");
        assert_eq!(message.body_text().unwrap(), "Hello, World!");
        assert_eq!(message.content_type().unwrap(), ContentType::text_plain());
    }

    #[test]
    fn test_message_base64_body() {
        let mut headers = Headers::new();
        headers.add("Content-Transfer-Encoding", "base64");
        let message = Message::new(headers, "SMOp\r\nbGxv".to_string());

        assert_eq!(message.body_text().unwrap(), "Héllo");
    }

    #[test]
    fn test_message_render_round_trip() {
        let mut headers = Headers::new();
        headers.add("Subject", "=?utf-8?B?SMOpbGxv?=");
        let message = Message::new(headers, "Body".to_string());

        let rendered = message.to_string();
        assert_eq!(rendered, "Subject: =?utf-8?B?SMOpbGxv?=\r\n\r\nBody");

        let parsed = Message::parse(&rendered).unwrap();
        assert_eq!(parsed.subject().unwrap(), "Héllo");
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_missing_subject() {
        let message = Message::new(Headers::new(), String::new());
        assert!(matches!(message.subject(), Err(Error::MissingHeader(_))));
    }
}
