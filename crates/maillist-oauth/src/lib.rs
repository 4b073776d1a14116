//! # maillist-oauth
//!
//! `OAuth2` authorization for desktop mail clients talking to the Gmail REST
//! API.
//!
//! ## Features
//!
//! - **Loopback login**: Authorization Code Flow with PKCE, redirecting to an
//!   ephemeral listener on `127.0.0.1`
//! - **Client registration**: reads the `credentials.json` downloaded from the
//!   Google Cloud console
//! - **Token management**: refresh, expiration checking and an on-disk cache
//!   that can be moved aside to force a fresh login
//!
//! ## Quick Start
//!
//! ```ignore
//! use maillist_oauth::{ClientSecrets, LoopbackLogin, TokenStore};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secrets = ClientSecrets::from_file("credentials.json").await?;
//!     let store = TokenStore::new("token.json");
//!
//!     let token = match store.load().await? {
//!         Some(token) if token.is_valid() => token,
//!         Some(token) => secrets.client()?.refresh_token(&token).await?,
//!         None => {
//!             LoopbackLogin::new(secrets.client()?, Duration::from_secs(300))
//!                 .authorize(|url| println!("Visit: {url}"))
//!                 .await?
//!         }
//!     };
//!     store.save(&token).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
mod secrets;
pub mod token;

pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, LoopbackLogin, OAuthClient, PkceChallenge, receive_code};
pub use provider::Provider;
pub use secrets::ClientSecrets;
pub use token::{Token, TokenStore};
