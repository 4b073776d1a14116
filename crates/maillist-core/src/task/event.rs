//! Events delivered from a running task.

use std::any::Any;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Identifier assigned to each submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Event emitted by a task.
///
/// A submission yields any number of `Progress` events, then exactly one of
/// `Result` or `Error`, then `Finished`.
#[derive(Debug)]
pub enum TaskEvent<T, P> {
    /// Intermediate report from the operation.
    Progress(P),
    /// The operation's return value.
    Result(T),
    /// The operation failed or panicked.
    Error(TaskFailure),
    /// Always the last event.
    Finished,
}

/// How a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The operation returned an error.
    Error,
    /// The operation panicked.
    Panic,
    /// The runtime dropped the task before it completed.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Panic => "panic",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Captured failure of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Top-level message.
    pub message: String,
    /// Full error chain (and backtrace, when captured).
    pub trace: String,
}

impl TaskFailure {
    pub(crate) fn from_error(error: &anyhow::Error) -> Self {
        Self {
            kind: FailureKind::Error,
            message: error.to_string(),
            trace: format!("{error:?}"),
        }
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "task panicked".to_string());
        Self {
            kind: FailureKind::Panic,
            trace: format!("panicked: {message}"),
            message,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "task was cancelled".to_string(),
            trace: String::new(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Emitter for progress events, handed to the operation.
pub struct Progress<P> {
    emit: Box<dyn Fn(P) + Send + Sync>,
}

impl<P: Send + 'static> Progress<P> {
    pub(crate) fn new<T: Send + 'static>(tx: UnboundedSender<TaskEvent<T, P>>) -> Self {
        Self {
            emit: Box::new(move |value| {
                // The handle may already be gone; nobody is listening then
                let _ = tx.send(TaskEvent::Progress(value));
            }),
        }
    }

    /// Reports progress to the handle's owner.
    pub fn emit(&self, value: impl Into<P>) {
        (self.emit)(value.into());
    }
}

impl<P> fmt::Debug for Progress<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
