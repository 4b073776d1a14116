//! # maillist-core
//!
//! Core logic for `MailList`, a desktop tool that sends one message to a list
//! of recipients through the Gmail REST API, one API call per recipient.
//!
//! This crate provides:
//! - **Gmail API client** - profile lookup and raw message sending
//! - **Message composition** - deterministic base64url `raw` payloads
//! - **Batch sending** - in-order sending that reports per-recipient outcomes
//! - **Authenticator** - cached, refreshed or interactive `OAuth2` login
//! - **Task runner** - bounded background pool with polled event handles
//! - **Controller** - interface-independent application state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod batch;
pub mod compose;
pub mod config;
pub mod controller;
mod error;
pub mod gmail;
pub mod sender;
pub mod task;

pub use auth::{Authenticator, Backend, GmailBackend, Session};
pub use batch::{BatchSummary, parse_recipients, send_batch};
pub use compose::{BodyKind, Message, RawMessage, build};
pub use config::{Settings, ThemeName};
pub use controller::{AuthOutcome, Controller, Form, Notice, ProgressBar};
pub use error::{Error, Result};
pub use gmail::{ApiError, GmailClient, MailApi, Profile, Receipt};
pub use sender::{Emailer, SendFailure, SendOutcome};
pub use task::{FailureKind, Progress, TaskEvent, TaskFailure, TaskHandle, TaskId, TaskRunner};
