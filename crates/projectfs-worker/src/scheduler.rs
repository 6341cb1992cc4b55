//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use projectfs_core::config::{RecycleBinConfig, WatcherConfig};
use projectfs_core::error::AppError;

use crate::executor::JobExecutor;
use crate::jobs::cleanup::RECYCLE_BIN_CLEANUP;
use crate::jobs::sweep::WATCHER_SWEEP;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor the scheduled runs are dispatched to
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("job_types", &self.executor.registered_types())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the recycle bin cleanup and the watcher sweep.
    ///
    /// Cleanup is skipped when disabled in config; the sweep is skipped
    /// when watchers are disabled.
    pub async fn register_default_tasks(
        &self,
        recycle_bin: &RecycleBinConfig,
        watcher: &WatcherConfig,
    ) -> Result<(), AppError> {
        if recycle_bin.cleanup_enabled {
            self.register(RECYCLE_BIN_CLEANUP, &recycle_bin.cleanup_schedule)
                .await?;
        } else {
            tracing::info!("Recycle bin cleanup disabled; not scheduling");
        }

        if watcher.enabled {
            self.register(WATCHER_SWEEP, &watcher.sweep_schedule).await?;
        }

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Schedule `job_type` on a six-field cron expression.
    pub async fn register(&self, job_type: &str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled task '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                tracing::debug!(job_type = %name, "Running scheduled task");
                match executor.execute(&name).await {
                    Ok(result) => tracing::info!(job_type = %name, %result, "Scheduled task finished"),
                    Err(e) => tracing::error!(job_type = %name, "Scheduled task failed: {}", e),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {e}"))
        })?;

        tracing::info!("Registered: {} ({})", job_type, schedule);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
