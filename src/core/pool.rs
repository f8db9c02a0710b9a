// ─── Worker Pool ───
// Fixed-capacity slot scheduler for download tasks.
//
// `submit` waits for a free slot (waiters are served FIFO by the fair
// semaphore), then spawns the task and returns. `join` resolves once no task
// is executing. Task errors never reach the submitter; they are pushed onto
// a failure channel that the owner drains after the wave.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// A task that failed inside the pool, tagged with the label it was
/// submitted under.
#[derive(Debug, serde::Serialize)]
pub struct TaskFailure {
    pub label: String,
    pub error: LauncherError,
}

pub struct WorkerPool {
    capacity: usize,
    slots: Arc<Semaphore>,
    executing: Arc<watch::Sender<usize>>,
    failures_tx: mpsc::UnboundedSender<TaskFailure>,
    failures_rx: mpsc::UnboundedReceiver<TaskFailure>,
}

/// Held by a running task; releases the slot and the executing count on
/// drop, including when the task panics.
struct SlotGuard {
    executing: Arc<watch::Sender<usize>>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.executing.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl WorkerPool {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (executing, _) = watch::channel(0usize);
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        Self {
            capacity,
            slots: Arc::new(Semaphore::new(capacity)),
            executing: Arc::new(executing),
            failures_tx,
            failures_rx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn executing(&self) -> usize {
        *self.executing.borrow()
    }

    /// Start `task` in a free slot, waiting in line when all slots are busy.
    ///
    /// Returns as soon as the task has been started; its outcome is only
    /// visible through [`WorkerPool::drain_failures`].
    pub async fn submit<F>(&self, label: impl Into<String>, task: F) -> LauncherResult<()>
    where
        F: Future<Output = LauncherResult<()>> + Send + 'static,
    {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| LauncherError::Other("worker pool is closed".into()))?;

        self.executing.send_modify(|n| *n += 1);
        let guard = SlotGuard {
            executing: Arc::clone(&self.executing),
            _permit: permit,
        };

        let label = label.into();
        let failures = self.failures_tx.clone();
        tokio::spawn(async move {
            let _guard = guard;
            match task.await {
                Ok(()) => debug!(task = %label, "pool task finished"),
                Err(error) => {
                    warn!(task = %label, "pool task failed: {}", error);
                    let _ = failures.send(TaskFailure { label, error });
                }
            }
        });

        Ok(())
    }

    /// Resolve once no task is executing. Returns immediately when the pool
    /// is idle.
    pub async fn join(&self) {
        let mut rx = self.executing.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Take every failure recorded since the last drain.
    pub fn drain_failures(&mut self) -> Vec<TaskFailure> {
        let mut failures = Vec::new();
        while let Ok(failure) = self.failures_rx.try_recv() {
            failures.push(failure);
        }
        failures
    }
}
