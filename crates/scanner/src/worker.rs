//! Worker pool: bounded queue plus N scan workers.
//!
//! The accept path only ever sees the dispatcher, whose `dispatch` is the
//! "enqueue succeeded/failed" boundary; it never blocks a request handler.
//! Workers share one receiver and stop when every dispatcher clone has been
//! dropped and the queue has drained.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::runner::ScanRunner;
use crate::task::ScanTask;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of concurrent scan workers.
    pub workers: usize,
    /// Queue capacity; dispatch fails fast once it is full.
    pub queue_depth: usize,
    /// Name used in worker log fields.
    pub name: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            queue_depth: 64,
            name: "scan-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Why a task could not be enqueued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("scan queue is full")]
    QueueFull,

    #[error("worker pool is shut down")]
    Closed,
}

/// Sending half handed to the accept path.
#[derive(Debug, Clone)]
pub struct ScanDispatcher {
    tx: mpsc::Sender<ScanTask>,
}

impl ScanDispatcher {
    /// Enqueue a task without blocking.
    pub fn dispatch(&self, task: ScanTask) -> Result<(), DispatchError> {
        self.tx.try_send(task).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}

/// Handle to a running pool.
#[derive(Debug)]
pub struct WorkerPoolHandle {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPoolHandle {
    /// Wait for the workers to drain the queue and stop.
    ///
    /// Workers only stop once every [`ScanDispatcher`] clone is dropped.
    pub async fn join(self) {
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Spawn the pool, returning the dispatcher and the running handle.
pub fn spawn(config: WorkerPoolConfig, runner: Arc<ScanRunner>) -> (ScanDispatcher, WorkerPoolHandle) {
    let (tx, rx) = mpsc::channel::<ScanTask>(config.queue_depth);
    let rx = Arc::new(tokio::sync::Mutex::new(rx));

    let mut workers = Vec::with_capacity(config.workers);
    for index in 0..config.workers {
        let rx = rx.clone();
        let runner = runner.clone();
        let worker_name = format!("{}-{index}", config.name);

        workers.push(tokio::spawn(async move {
            debug!(worker = %worker_name, "scan worker started");
            loop {
                // Hold the receiver lock only while waiting for the next
                // task, never across a scan.
                let task = rx.lock().await.recv().await;
                let Some(task) = task else { break };

                debug!(worker = %worker_name, request_id = %task.request_id, "picked up scan task");
                runner.run(task).await;
            }
            debug!(worker = %worker_name, "scan worker stopped");
        }));
    }

    (ScanDispatcher { tx }, WorkerPoolHandle { workers })
}
