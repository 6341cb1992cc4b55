//! Drains watcher-detected removals into the recycle bin.
//!
//! The watcher only queues paths that no longer stat, so the content is
//! usually gone by the time a task is processed. Those tasks end in
//! `NotFound` and are logged as unrecoverable; anything that reappeared
//! in the meantime is intercepted normally.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use projectfs_core::error::ErrorKind;
use projectfs_core::events::DeletionTask;
use projectfs_core::events::deletion::{DIRECT_DELETE, FILESYSTEM_WATCH, SYSTEM_USER};
use projectfs_service::RecycleBinService;
use projectfs_service::recycle_bin::InterceptRequest;

/// Create the bounded queue between the watcher and the worker.
pub fn deletion_queue(capacity: usize) -> (mpsc::Sender<DeletionTask>, mpsc::Receiver<DeletionTask>) {
    mpsc::channel(capacity.max(1))
}

/// How a single task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionResult {
    /// Moved into the bin.
    Intercepted,
    /// Content was already gone.
    Unrecoverable,
    /// Rejected or failed for another reason.
    Failed,
}

/// Single consumer of the deletion queue.
#[derive(Debug)]
pub struct DeletionWorker {
    recycle_bin: RecycleBinService,
}

impl DeletionWorker {
    /// Create a new deletion worker
    pub fn new(recycle_bin: RecycleBinService) -> Self {
        Self { recycle_bin }
    }

    /// Process tasks until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<DeletionTask>) {
        tracing::info!("Deletion worker started");
        let mut processed = 0u64;
        while let Some(task) = rx.recv().await {
            self.process(task).await;
            processed += 1;
        }
        tracing::info!(processed, "Deletion worker stopped");
    }

    /// Spawn [`run`](Self::run) onto the runtime.
    pub fn spawn(self, rx: mpsc::Receiver<DeletionTask>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    /// Intercept one task's path on behalf of the system user.
    pub async fn process(&self, task: DeletionTask) -> DeletionResult {
        let path = PathBuf::from(&task.path);
        let request = InterceptRequest {
            client_id: task.client_id,
            project_id: Some(task.project_id),
            user_id: SYSTEM_USER.to_string(),
            deleted_by: SYSTEM_USER.to_string(),
            deletion_reason: DIRECT_DELETE.to_string(),
            deletion_method: FILESYSTEM_WATCH.to_string(),
        };

        match self.recycle_bin.intercept(&path, request).await {
            Ok(outcome) => {
                tracing::info!(
                    path = %task.path,
                    project_id = %task.project_id,
                    recycle_bin_id = %outcome.recycle_bin_id,
                    "External deletion captured"
                );
                DeletionResult::Intercepted
            }
            Err(e) if e.is(ErrorKind::NotFound) => {
                tracing::warn!(
                    path = %task.path,
                    project_id = %task.project_id,
                    is_folder = task.is_folder,
                    "External deletion is unrecoverable; content already gone"
                );
                DeletionResult::Unrecoverable
            }
            Err(e) => {
                tracing::error!(path = %task.path, "Failed to capture external deletion: {}", e);
                DeletionResult::Failed
            }
        }
    }
}
