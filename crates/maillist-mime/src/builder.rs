//! Builder for outgoing single-part text messages.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_body, is_seven_bit};
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::{Message, TransferEncoding};

/// Builds a single-part `text/plain` or `text/html` message.
///
/// No `Date` or `Message-ID` headers are generated, so identical inputs
/// always render to identical bytes.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    to: Option<String>,
    from: Option<String>,
    subject: Option<String>,
    body: String,
    html: bool,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    /// Sets the sender.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets a plain text body.
    #[must_use]
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.html = false;
        self
    }

    /// Sets an HTML body.
    #[must_use]
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.html = true;
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns an error if a header value contains a line break or
    /// cannot be encoded.
    pub fn build(self) -> Result<Message> {
        let mut headers = Headers::new();

        for (name, value) in [("To", &self.to), ("From", &self.from)] {
            if let Some(value) = value {
                headers.add(name, checked_header(name, value)?);
            }
        }

        if let Some(subject) = &self.subject {
            let subject = checked_header("Subject", subject)?;
            headers.add("Subject", Headers::encode_value(subject)?);
        }

        let content_type = if self.html {
            ContentType::text_html()
        } else {
            ContentType::text_plain()
        };

        let body = normalize_line_endings(&self.body);
        let (encoding, encoded_body) = if is_seven_bit(&body) {
            (TransferEncoding::SevenBit, body)
        } else {
            (TransferEncoding::Base64, encode_base64_body(body.as_bytes()))
        };

        headers.add("MIME-Version", "1.0");
        headers.add("Content-Type", content_type.to_string());
        headers.add("Content-Transfer-Encoding", encoding.to_string());

        Ok(Message::new(headers, encoded_body))
    }
}

/// Rejects header values that would inject extra header lines.
fn checked_header<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.contains(['\r', '\n']) {
        return Err(Error::InvalidHeader(format!(
            "{name} must not contain line breaks"
        )));
    }
    Ok(value)
}

/// Converts bare `\n` line endings to CRLF.
fn normalize_line_endings(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous = '\0';
    for c in text.chars() {
        if c == '\n' && previous != '\r' {
            result.push('\r');
        }
        result.push(c);
        previous = c;
    }
    result
}
