//! # maillist-mime
//!
//! MIME message generation for outgoing email.
//!
//! ## Features
//!
//! - **Message generation**: Single-part `text/plain` and `text/html` messages
//! - **Deterministic output**: Ordered headers, no generated dates or ids
//! - **Encoding/Decoding**: Base64, URL-safe Base64, RFC 2047 header encoding
//! - **Parsing**: Enough of RFC 5322 to read back what the builder produces
//!
//! ## Quick Start
//!
//! ### Building a Message
//!
//! ```ignore
//! use maillist_mime::MessageBuilder;
//!
//! let message = MessageBuilder::new()
//!     .to("recipient@example.com")
//!     .from("me")
//!     .subject("Test Message")
//!     .text_body("Hello, World!")
//!     .build()?;
//!
//! println!("{message}");
//! ```
//!
//! ### Encoding for Web APIs
//!
//! ```ignore
//! use maillist_mime::encoding::encode_base64url;
//!
//! let raw = encode_base64url(&message.to_bytes());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use builder::MessageBuilder;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, TransferEncoding};
