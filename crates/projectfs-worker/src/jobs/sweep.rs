//! Idle watcher eviction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use projectfs_realtime::DiskWatcher;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type name.
pub const WATCHER_SWEEP: &str = "watcher_sweep";

/// Runs [`DiskWatcher::sweep`].
#[derive(Debug)]
pub struct WatcherSweepJob {
    watcher: Arc<DiskWatcher>,
}

impl WatcherSweepJob {
    /// Create a new sweep job handler
    pub fn new(watcher: Arc<DiskWatcher>) -> Self {
        Self { watcher }
    }
}

#[async_trait]
impl JobHandler for WatcherSweepJob {
    fn job_type(&self) -> &str {
        WATCHER_SWEEP
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let evicted = self.watcher.sweep();
        Ok(serde_json::json!({
            "task": WATCHER_SWEEP,
            "evicted": evicted.len(),
            "remaining": self.watcher.watched_count(),
        }))
    }
}
