//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use projectfs_core::config::AppConfig;
use projectfs_core::events::DeletionTask;
use projectfs_core::traits::SharedClock;
use projectfs_database::{ProjectDirectory, RecycleBinRepository};
use projectfs_realtime::{DiskWatcher, RealtimeEngine};
use projectfs_service::{FolderService, RecycleBinService, Relocator};
use projectfs_storage::{DiskRoot, Scaffolder};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Project folder lookup, tree and folder operations
    pub folders: FolderService,
    /// Recycle bin lifecycle
    pub recycle_bin: RecycleBinService,
    /// Project folder relocation
    pub relocator: Relocator,
    /// Watchers and WebSocket fan-out
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Wire every service from configuration and the two repositories.
    ///
    /// External removals detected by the watcher are queued on `deletions`
    /// when it is given.
    pub fn assemble(
        config: AppConfig,
        projects: Arc<dyn ProjectDirectory>,
        recycle_items: Arc<dyn RecycleBinRepository>,
        clock: SharedClock,
        deletions: Option<mpsc::Sender<DeletionTask>>,
    ) -> Self {
        let scaffolder = Scaffolder::new(DiskRoot::probe(&config.storage), config.folders.clone());
        let folders = FolderService::new(projects, scaffolder.clone());
        let recycle_bin = RecycleBinService::new(
            recycle_items,
            config.recycle_bin.clone(),
            clock.clone(),
            config.realtime.channel_buffer_size,
        );
        let watcher = Arc::new(DiskWatcher::new(
            folders.clone(),
            config.watcher.clone(),
            clock,
            deletions,
            Duration::from_millis(config.logging.watcher_coalesce_ms),
        ));
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), watcher));

        Self {
            config: Arc::new(config),
            folders,
            recycle_bin,
            relocator: Relocator::new(scaffolder),
            realtime,
            started_at: Instant::now(),
        }
    }

    /// The shared watcher registry.
    pub fn watcher(&self) -> &Arc<DiskWatcher> {
        &self.realtime.watcher
    }
}
