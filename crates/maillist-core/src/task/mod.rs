//! Background task runner.
//!
//! Long operations run on a bounded pool of tokio tasks. Each submission gets
//! a [`TaskHandle`] whose events the interactive thread drains on its own
//! schedule, so worker code never touches UI state.

mod event;
mod runner;

pub use event::{FailureKind, Progress, TaskEvent, TaskFailure, TaskId};
pub use runner::{TaskHandle, TaskRunner};
