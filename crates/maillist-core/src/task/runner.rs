//! Bounded worker pool and per-submission handles.

use super::event::{Progress, TaskEvent, TaskFailure, TaskId};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};

/// Runs operations on a tokio runtime, at most `capacity` at a time.
///
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    handle: Handle,
    permits: Arc<Semaphore>,
    capacity: usize,
    active: Arc<AtomicUsize>,
    next_id: Arc<AtomicU64>,
}

impl TaskRunner {
    /// Creates a runner on `handle` with room for `capacity` concurrent
    /// operations (at least one).
    #[must_use]
    pub fn new(handle: Handle, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            handle,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            active: Arc::new(AtomicUsize::new(0)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Creates a runner sized to the machine's available parallelism.
    #[must_use]
    pub fn with_available_parallelism(handle: Handle) -> Self {
        let capacity = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(handle, capacity)
    }

    /// Maximum number of concurrently running operations.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of operations currently running (not counting queued ones).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Queues `operation` and returns immediately.
    ///
    /// The operation's `Err` or panic is captured as a [`TaskFailure`];
    /// either way the handle sees a terminal event followed by
    /// [`TaskEvent::Finished`].
    pub fn submit<T, P, F, Fut>(&self, operation: F) -> TaskHandle<T, P>
    where
        T: Send + 'static,
        P: Send + 'static,
        F: FnOnce(Progress<P>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        let progress = Progress::new(tx.clone());

        let permits = Arc::clone(&self.permits);
        let active = Arc::clone(&self.active);
        let runtime = self.handle.clone();

        self.handle.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                let _ = tx.send(TaskEvent::Error(TaskFailure::cancelled()));
                let _ = tx.send(TaskEvent::Finished);
                return;
            };

            active.fetch_add(1, Ordering::SeqCst);
            debug!(%id, "Task started");

            // Inner task so a panic surfaces as a JoinError instead of
            // tearing down this supervisor
            let joined = runtime
                .spawn(async move { operation(progress).await })
                .await;

            let event = match joined {
                Ok(Ok(value)) => TaskEvent::Result(value),
                Ok(Err(error)) => {
                    warn!(%id, "Task failed: {error:#}");
                    TaskEvent::Error(TaskFailure::from_error(&error))
                }
                Err(join_error) if join_error.is_panic() => {
                    let failure = TaskFailure::from_panic(&*join_error.into_panic());
                    warn!(%id, "Task panicked: {}", failure.message);
                    TaskEvent::Error(failure)
                }
                Err(_) => TaskEvent::Error(TaskFailure::cancelled()),
            };

            let _ = tx.send(event);
            active.fetch_sub(1, Ordering::SeqCst);
            let _ = tx.send(TaskEvent::Finished);
            debug!(%id, "Task finished");
        });

        TaskHandle {
            id,
            rx,
            finished: false,
        }
    }
}

/// Receiving end for one submission's events.
#[derive(Debug)]
pub struct TaskHandle<T, P> {
    id: TaskId,
    rx: UnboundedReceiver<TaskEvent<T, P>>,
    finished: bool,
}

impl<T, P> TaskHandle<T, P> {
    /// Returns the submission id.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns true once [`TaskEvent::Finished`] has been received.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the next pending event without waiting.
    pub fn try_next(&mut self) -> Option<TaskEvent<T, P>> {
        let event = self.rx.try_recv().ok()?;
        self.observe(&event);
        Some(event)
    }

    /// Returns every pending event without waiting.
    pub fn drain(&mut self) -> Vec<TaskEvent<T, P>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Waits for the next event; `None` after the last one.
    pub async fn next(&mut self) -> Option<TaskEvent<T, P>> {
        let event = self.rx.recv().await?;
        self.observe(&event);
        Some(event)
    }

    fn observe(&mut self, event: &TaskEvent<T, P>) {
        if matches!(event, TaskEvent::Finished) {
            self.finished = true;
        }
    }
}
