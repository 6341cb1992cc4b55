//! Recycle bin retention and size cleanup.

use async_trait::async_trait;
use serde_json::Value;

use projectfs_service::RecycleBinService;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type name.
pub const RECYCLE_BIN_CLEANUP: &str = "recycle_bin_cleanup";

/// Runs [`RecycleBinService::run_scheduled_cleanup`].
#[derive(Debug)]
pub struct RecycleBinCleanupJob {
    service: RecycleBinService,
}

impl RecycleBinCleanupJob {
    /// Create a new cleanup job handler
    pub fn new(service: RecycleBinService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl JobHandler for RecycleBinCleanupJob {
    fn job_type(&self) -> &str {
        RECYCLE_BIN_CLEANUP
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let report = self
            .service
            .run_scheduled_cleanup()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Recycle bin cleanup failed: {e}")))?;

        Ok(serde_json::json!({
            "task": RECYCLE_BIN_CLEANUP,
            "expired_deleted": report.expired_deleted,
            "size_limit_deleted": report.size_limit_deleted,
            "total_size_freed": report.total_size_freed,
            "remaining_size": report.remaining_size,
            "failures": report.failures.len(),
        }))
    }
}
