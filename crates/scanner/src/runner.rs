//! Scan runner: drives one request through the result lifecycle.

use std::sync::Arc;

use tracing::{info, warn};

use scanrelay_core::{ResultItem, ResultKey};
use scanrelay_store::{ResultStore, TargetLock};

use crate::engine::ScanEngine;
use crate::profile::ScannerProfile;
use crate::task::ScanTask;

/// Executes accepted scan tasks.
///
/// The accept path has already claimed the uniqueness lock for the task's
/// target before the task reaches a runner; the runner owns the other half
/// of that contract and releases the lock on every exit path.
pub struct ScanRunner {
    store: Arc<dyn ResultStore>,
    lock: Arc<dyn TargetLock>,
    engine: Arc<dyn ScanEngine>,
    profile: Arc<ScannerProfile>,
}

impl ScanRunner {
    pub fn new(
        store: Arc<dyn ResultStore>,
        lock: Arc<dyn TargetLock>,
        engine: Arc<dyn ScanEngine>,
        profile: Arc<ScannerProfile>,
    ) -> Self {
        Self {
            store,
            lock,
            engine,
            profile,
        }
    }

    /// Run one task to completion.
    ///
    /// Store failures along the way are logged rather than propagated: the
    /// caller already moved on when the request was accepted, and the
    /// retention expiry bounds how long a stale record can linger.
    pub async fn run(&self, task: ScanTask) {
        let key = self.profile.result_key(task.request_id);
        let lock_key = self.profile.lock_key(&task.image);

        self.execute(&key, &task).await;

        if let Err(e) = self.lock.release(&lock_key).await {
            warn!(request_id = %task.request_id, error = %e, "failed to release scan lock");
        }
    }

    async fn execute(&self, key: &ResultKey, task: &ScanTask) {
        // Recoverable: the terminal write below still lands without it.
        if let Err(e) = self.store.save(key, &ResultItem::ongoing()).await {
            warn!(request_id = %task.request_id, error = %e, "failed to mark scan ongoing");
        }

        let terminal = match self.engine.scan(task).await {
            Ok(report) => ResultItem::success(report),
            Err(e) => {
                warn!(request_id = %task.request_id, image = %task.image, error = %e, "scan failed");
                ResultItem::error(e.to_string())
            }
        };

        match self.store.save(key, &terminal).await {
            Ok(()) => {
                info!(
                    request_id = %task.request_id,
                    image = %task.image,
                    status = %terminal.status,
                    "scan finished"
                );
            }
            Err(e) => {
                warn!(request_id = %task.request_id, error = %e, "failed to persist terminal scan result");
            }
        }
    }
}
