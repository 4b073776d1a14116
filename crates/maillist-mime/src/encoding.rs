//! MIME encoding and decoding utilities.
//!
//! Supports Base64 (standard and URL-safe) and RFC 2047 header encoding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

/// Maximum line length for encoded bodies (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes data as padded URL-safe Base64 (RFC 4648 §5).
///
/// This is the form web mail APIs expect for raw message uploads.
#[must_use]
pub fn encode_base64url(data: &[u8]) -> String {
    URL_SAFE.encode(data)
}

/// Decodes padded URL-safe Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid URL-safe Base64.
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE.decode(data).map_err(Into::into)
}

/// Encodes a body as Base64 wrapped at [`MAX_LINE_LENGTH`] with CRLF line breaks.
#[must_use]
pub fn encode_base64_body(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);

    // Base64 output is pure ASCII, so byte chunks are valid char boundaries
    for (i, chunk) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            result.push_str("\r\n");
        }
        result.push_str(&String::from_utf8_lossy(chunk));
    }

    result
}

/// Returns true if the text can be sent as-is in a 7bit body.
#[must_use]
pub fn is_seven_bit(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii() && b != 0)
        && text.lines().all(|line| line.len() <= 998)
}

/// Longest encoded word, leaving room for the header name on the first line.
const MAX_ENCODED_WORD_LENGTH: usize = 64;

/// Encodes a header value using RFC 2047 encoding.
///
/// Format: `=?charset?encoding?encoded-text?=`
///
/// Long values are split on character boundaries into several encoded words,
/// folded onto continuation lines with `CRLF SP`.
///
/// # Arguments
///
/// * `text` - Text to encode
/// * `charset` - Character set (e.g., "utf-8")
///
/// # Errors
///
/// Returns an error if the charset is empty or too long to leave room for
/// any encoded text.
pub fn encode_rfc2047(text: &str, charset: &str) -> Result<String> {
    if charset.is_empty() {
        return Err(Error::InvalidEncoding("Empty charset".to_string()));
    }

    // Only encode if necessary (contains non-ASCII or encoded-word markers)
    if text
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '=' && c != '?')
    {
        return Ok(text.to_string());
    }

    // "=?" + charset + "?B?" + text + "?="
    let overhead = charset.len() + 7;
    let chunk_bytes = MAX_ENCODED_WORD_LENGTH.saturating_sub(overhead) / 4 * 3;
    if chunk_bytes < 4 {
        return Err(Error::InvalidEncoding(format!(
            "Charset too long: {charset}"
        )));
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > chunk_bytes {
            words.push(encoded_word(&chunk, charset));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk, charset));
    }

    Ok(words.join("\r\n "))
}

fn encoded_word(text: &str, charset: &str) -> String {
    format!("=?{charset}?B?{}?=", encode_base64(text.as_bytes()))
}

/// Strips the `=?` and `?=` delimiters of an encoded word.
fn encoded_word_inner(word: &str) -> Option<&str> {
    word.strip_prefix("=?")?.strip_suffix("?=")
}

/// Decodes an RFC 2047 encoded header value.
///
/// Only the `B` (Base64) encoding produced by [`encode_rfc2047`] is understood.
/// Whitespace between adjacent encoded words is dropped, so a folded value
/// decodes to the text it was built from. A value that is not made up
/// entirely of encoded words is returned unchanged.
///
/// # Errors
///
/// Returns an error if an encoded word is malformed.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let Some(words) = text
        .split_whitespace()
        .map(encoded_word_inner)
        .collect::<Option<Vec<_>>>()
        .filter(|words| !words.is_empty())
    else {
        return Ok(text.to_string());
    };

    let mut decoded = Vec::new();
    for inner in words {
        decoded.extend(decode_encoded_word(inner)?);
    }
    String::from_utf8(decoded).map_err(Into::into)
}

fn decode_encoded_word(inner: &str) -> Result<Vec<u8>> {
    let parts: Vec<&str> = inner.split('?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    };

    if !encoding.eq_ignore_ascii_case("b") {
        return Err(Error::InvalidEncoding(format!(
            "Unsupported encoding: {encoding}"
        )));
    }

    decode_base64(encoded_text)
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
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64url_uses_safe_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet
        let encoded = encode_base64url(&[0xfb, 0xff]);
        assert_eq!(encoded, "-_8=");
        assert_eq!(decode_base64url(&encoded).unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_base64_body_wrapping() {
        let data = vec![b'a'; 200];
        let encoded = encode_base64_body(&data);
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH);
        }
        let joined: String = encoded.split("\r\n").collect();
        assert_eq!(decode_base64(&joined).unwrap(), data);
    }

    #[test]
    fn test_seven_bit_detection() {
        assert!(is_seven_bit("Hello\r\nWorld"));
        assert!(!is_seven_bit("Héllo"));
        assert!(!is_seven_bit(&"x".repeat(1000)));
    }

    #[test]
    fn test_rfc2047_encode() {
        let text = "Hello";
        let encoded = encode_rfc2047(text, "utf-8").unwrap();
        assert_eq!(encoded, "Hello"); // No encoding needed

        let text = "Héllo";
        let encoded = encode_rfc2047(text, "utf-8").unwrap();
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_rfc2047_encode_rejects_empty_charset() {
        assert!(encode_rfc2047("Héllo", "").is_err());
        assert!(encode_rfc2047("Héllo", &"x".repeat(60)).is_err());
    }

    #[test]
    fn test_rfc2047_long_value_is_split() {
        let text = "Grüße aus Köln, wir treffen uns am Freitag um fünf Uhr im Café am Dom";
        let encoded = encode_rfc2047(text, "utf-8").unwrap();

        let words: Vec<&str> = encoded.split("\r\n ").collect();
        assert!(words.len() > 1);
        for word in &words {
            assert!(word.len() <= MAX_ENCODED_WORD_LENGTH, "{word}");
            assert!(word.starts_with("=?utf-8?B?") && word.ends_with("?="));
            // Every word holds whole characters
            let inner = encoded_word_inner(word).unwrap();
            assert!(String::from_utf8(decode_encoded_word(inner).unwrap()).is_ok());
        }

        assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
        // Header parsing unfolds continuation lines with a single space
        assert_eq!(decode_rfc2047(&words.join(" ")).unwrap(), text);
    }

    #[test]
    fn test_rfc2047_decode_mixed_text_unchanged() {
        let text = "=?utf-8?B?SMOpbGxv?= world";
        assert_eq!(decode_rfc2047(text).unwrap(), text);
        assert_eq!(decode_rfc2047("").unwrap(), "");
    }

    #[test]
    fn test_rfc2047_decode() {
        let encoded = "Hello";
        let decoded = decode_rfc2047(encoded).unwrap();
        assert_eq!(decoded, "Hello");

        let encoded = "=?utf-8?B?SMOpbGxv?=";
        let decoded = decode_rfc2047(encoded).unwrap();
        assert_eq!(decoded, "Héllo");
    }

    #[test]
    fn test_rfc2047_decode_unsupported() {
        assert!(decode_rfc2047("=?utf-8?Q?H=C3=A9llo?=").is_err());
        assert!(decode_rfc2047("=?utf-8?B?=").is_err());
    }

    proptest! {
        #[test]
        fn rfc2047_header_values_survive_encoding(text in "\\PC{0,200}") {
            let encoded = encode_rfc2047(&text, "utf-8").unwrap();
            prop_assert!(encoded.is_ascii());
            prop_assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
        }
    }
}
