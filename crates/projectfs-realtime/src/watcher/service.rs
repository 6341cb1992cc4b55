//! Watcher registry: start, stop, touch, sweep.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use projectfs_core::config::WatcherConfig;
use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::events::{ChangeAction, DeletionTask, DiskChange};
use projectfs_core::result::AppResult;
use projectfs_core::traits::SharedClock;
use projectfs_core::types::{ClientId, ProjectId};
use projectfs_service::FolderService;

use super::coalesce::LogCoalescer;
use super::normalize::Normalizer;

/// How long a claimed removal suppresses the deletion queue.
const CLAIM_TTL_SECONDS: i64 = 60;

/// Paths whose removal was already routed to the recycle bin by the API.
type Claims = Arc<DashMap<PathBuf, DateTime<Utc>>>;

/// Last activity of one watch, in epoch milliseconds. Shared between the
/// registry and the event pump so disk changes keep a watch alive.
#[derive(Debug, Clone)]
struct Activity(Arc<AtomicI64>);

impl Activity {
    fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(AtomicI64::new(at.timestamp_millis())))
    }

    fn stamp(&self, at: DateTime<Utc>) {
        self.0.fetch_max(at.timestamp_millis(), Ordering::Relaxed);
    }

    fn get(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0.load(Ordering::Relaxed)).unwrap_or_default()
    }
}

/// One live watch.
struct WatchEntry {
    root: PathBuf,
    started_at: DateTime<Utc>,
    last_activity: Activity,
    /// Dropping it deregisters the OS watch.
    _watcher: Mutex<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl Drop for WatchEntry {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Snapshot of a watch for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchInfo {
    /// Watched project.
    pub project_id: ProjectId,
    /// Watched folder.
    pub root: PathBuf,
    /// When the watch started.
    pub started_at: DateTime<Utc>,
    /// Last start, touch, subscription, or disk change.
    pub last_activity: DateTime<Utc>,
}

/// Registry of per-project disk watchers.
pub struct DiskWatcher {
    entries: DashMap<ProjectId, WatchEntry>,
    folders: FolderService,
    config: WatcherConfig,
    clock: SharedClock,
    changes: broadcast::Sender<DiskChange>,
    deletions: Option<mpsc::Sender<DeletionTask>>,
    claims: Claims,
    log_window: StdDuration,
}

impl std::fmt::Debug for DiskWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskWatcher")
            .field("enabled", &self.config.enabled)
            .field("watching", &self.entries.len())
            .finish()
    }
}

impl DiskWatcher {
    /// Creates a new watcher registry.
    ///
    /// Removals are queued on `deletions` when it is given.
    pub fn new(
        folders: FolderService,
        config: WatcherConfig,
        clock: SharedClock,
        deletions: Option<mpsc::Sender<DeletionTask>>,
        log_window: StdDuration,
    ) -> Self {
        let (changes, _) = broadcast::channel(config.event_buffer_size.max(1));
        Self {
            entries: DashMap::new(),
            folders,
            config,
            clock,
            changes,
            deletions,
            claims: Arc::new(DashMap::new()),
            log_window,
        }
    }

    /// Mark `path` (and everything below it) as already routed to the
    /// recycle bin, so its removal events are forwarded but not queued.
    pub fn claim_removal(&self, path: &Path) {
        let now = self.clock.now();
        self.claims
            .retain(|_, claimed_at| now - *claimed_at < Duration::seconds(CLAIM_TTL_SECONDS));
        self.claims.insert(path.to_path_buf(), now);
    }

    /// Drop a claim whose recycle bin move did not happen, so a later
    /// removal of `path` is queued again.
    pub fn release_claim(&self, path: &Path) {
        self.claims.remove(path);
    }

    /// Whether removals of `path` are currently suppressed.
    pub fn is_claimed(&self, path: &Path) -> bool {
        claim_is_live(&self.claims, path, self.clock.now())
    }

    /// Whether watching is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The active configuration.
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Start watching a project's folder. Idempotent; an existing watch is
    /// only touched.
    ///
    /// Returns `false` when watching is disabled.
    pub async fn start_watch(&self, project_id: ProjectId) -> AppResult<bool> {
        if !self.config.enabled {
            debug!(%project_id, "Watchers disabled, not starting");
            return Ok(false);
        }
        if self.touch(project_id) {
            return Ok(true);
        }

        let project = self.folders.find_project(project_id).await?;
        let root = self.folders.locate_project_root(&project, None).await?;
        let entry = self.spawn_watch(project_id, project.client_id, root).await?;

        match self.entries.entry(project_id) {
            Entry::Occupied(existing) => {
                // Lost a race with a concurrent start; ours is dropped.
                existing.get().last_activity.stamp(self.clock.now());
            }
            Entry::Vacant(slot) => {
                info!(%project_id, root = %entry.root.display(), "Watching project folder");
                slot.insert(entry);
            }
        }
        Ok(true)
    }

    /// Stop watching. Returns whether a watch existed.
    pub fn stop_watch(&self, project_id: ProjectId) -> bool {
        match self.entries.remove(&project_id) {
            Some((_, entry)) => {
                info!(%project_id, root = %entry.root.display(), "Stopped watching project folder");
                true
            }
            None => false,
        }
    }

    /// Stop every watch.
    pub fn stop_all(&self) -> usize {
        let ids: Vec<ProjectId> = self.entries.iter().map(|e| *e.key()).collect();
        ids.into_iter().filter(|id| self.stop_watch(*id)).count()
    }

    /// Mark a watch as recently used. Returns whether it exists.
    pub fn touch(&self, project_id: ProjectId) -> bool {
        match self.entries.get(&project_id) {
            Some(entry) => {
                entry.last_activity.stamp(self.clock.now());
                true
            }
            None => false,
        }
    }

    /// Stop watches idle for longer than the inactivity timeout. Disk changes
    /// count as activity.
    pub fn sweep(&self) -> Vec<ProjectId> {
        let now = self.clock.now();
        let limit = Duration::seconds(
            i64::try_from(self.config.inactivity_timeout_seconds).unwrap_or(i64::MAX),
        );
        let idle: Vec<ProjectId> = self
            .entries
            .iter()
            .filter(|e| now - e.last_activity.get() > limit)
            .map(|e| *e.key())
            .collect();

        let evicted: Vec<ProjectId> = idle.into_iter().filter(|id| self.stop_watch(*id)).collect();
        if !evicted.is_empty() {
            info!(evicted = evicted.len(), remaining = self.entries.len(), "Retired idle watchers");
        }
        evicted
    }

    /// Whether a project is being watched.
    pub fn is_watching(&self, project_id: ProjectId) -> bool {
        self.entries.contains_key(&project_id)
    }

    /// Number of live watches.
    pub fn watched_count(&self) -> usize {
        self.entries.len()
    }

    /// Snapshots of every live watch.
    pub fn watched(&self) -> Vec<WatchInfo> {
        self.entries
            .iter()
            .map(|e| WatchInfo {
                project_id: *e.key(),
                root: e.root.clone(),
                started_at: e.started_at,
                last_activity: e.last_activity.get(),
            })
            .collect()
    }

    /// Changes from every watched project.
    pub fn subscribe(&self) -> broadcast::Receiver<DiskChange> {
        self.changes.subscribe()
    }

    /// Run `callback` for every change in `project_id`, starting the watch
    /// if needed. The callback stops when the returned handle is aborted.
    pub async fn on_change<F>(&self, project_id: ProjectId, callback: F) -> AppResult<JoinHandle<()>>
    where
        F: Fn(DiskChange) + Send + Sync + 'static,
    {
        let mut rx = self.subscribe();
        self.start_watch(project_id).await?;
        Ok(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) if change.project_id == project_id => callback(change),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(%project_id, skipped = n, "Change callback lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Wait up to `timeout` for the next change in `project_id`.
    ///
    /// Answers `None` straight away when watching is disabled.
    pub async fn wait_for_change(
        &self,
        project_id: ProjectId,
        timeout: StdDuration,
    ) -> AppResult<Option<DiskChange>> {
        let mut rx = self.subscribe();
        if !self.start_watch(project_id).await? {
            return Ok(None);
        }
        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(change) if change.project_id == project_id => return Some(change),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        };
        Ok(tokio::time::timeout(timeout, wait).await.ok().flatten())
    }

    async fn spawn_watch(
        &self,
        project_id: ProjectId,
        client_id: Option<ClientId>,
        root: PathBuf,
    ) -> AppResult<WatchEntry> {
        let max_depth = self.config.max_depth;
        let normalizer = {
            let root = root.clone();
            tokio::task::spawn_blocking(move || {
                let mut n = Normalizer::new(root, max_depth);
                n.prime();
                n
            })
            .await?
        };

        let (tx, rx) = mpsc::channel::<Event>(self.config.event_buffer_size.max(1));
        let overflowing = Arc::new(AtomicBool::new(false));
        let mut watcher = {
            let overflowing = overflowing.clone();
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if tx.try_send(event).is_err() {
                        if !overflowing.swap(true, Ordering::Relaxed) {
                            warn!(%project_id, "Watcher event buffer full, dropping events");
                        }
                    } else {
                        overflowing.store(false, Ordering::Relaxed);
                    }
                }
                Err(e) => warn!(%project_id, error = %e, "Filesystem watcher error"),
            })
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to create watcher", e))?
        };
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to watch {}", root.display()),
                    e,
                )
            })?;

        let now = self.clock.now();
        let activity = Activity::new(now);
        let pump = EventPump {
            project_id,
            activity: activity.clone(),
            client_id,
            normalizer,
            changes: self.changes.clone(),
            deletions: self.deletions.clone(),
            claims: self.claims.clone(),
            clock: self.clock.clone(),
            log: LogCoalescer::new(self.log_window),
        };
        let task = tokio::spawn(pump.run(rx));

        Ok(WatchEntry {
            root,
            started_at: now,
            last_activity: activity,
            _watcher: Mutex::new(watcher),
            task,
        })
    }
}

/// Drains one project's raw events.
struct EventPump {
    project_id: ProjectId,
    activity: Activity,
    client_id: Option<ClientId>,
    normalizer: Normalizer,
    changes: broadcast::Sender<DiskChange>,
    deletions: Option<mpsc::Sender<DeletionTask>>,
    claims: Claims,
    clock: SharedClock,
    log: LogCoalescer,
}

impl EventPump {
    async fn run(mut self, mut rx: mpsc::Receiver<Event>) {
        loop {
            let deadline = self.log.deadline();
            tokio::select! {
                received = rx.recv() => match received {
                    Some(event) => self.handle(&event).await,
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(tokio::time::Instant::now)), if deadline.is_some() => {
                    self.log_burst();
                }
            }
        }
        self.log_burst();
    }

    async fn handle(&mut self, event: &Event) {
        for (path, action) in self.normalizer.normalize(event) {
            let Some(relative) = self.normalizer.relative(&path) else {
                continue;
            };
            let change = DiskChange {
                project_id: self.project_id,
                action_type: action,
                file_path: path.to_string_lossy().into_owned(),
                relative_path: relative.clone(),
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                timestamp: self.clock.now(),
            };
            self.activity.stamp(change.timestamp);
            self.log.record(action, &relative);
            // No subscribers is fine.
            let _ = self.changes.send(change);

            if action.is_removal() {
                self.queue_deletion(&path, action == ChangeAction::FolderRemoved)
                    .await;
            }
        }
    }

    async fn queue_deletion(&self, path: &Path, is_folder: bool) {
        let Some(queue) = &self.deletions else {
            return;
        };
        if tokio::fs::symlink_metadata(path).await.is_ok() {
            return;
        }
        if self.is_claimed(path) {
            debug!(path = %path.display(), "Removal already routed to the recycle bin");
            return;
        }
        let Some(client_id) = self.client_id else {
            warn!(
                project_id = %self.project_id,
                path = %path.display(),
                "External deletion has no client context, not routed to recycle bin"
            );
            return;
        };
        let task = DeletionTask {
            path: path.to_string_lossy().into_owned(),
            client_id,
            project_id: self.project_id,
            is_folder,
            detected_at: self.clock.now(),
        };
        match queue.try_send(task) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(task)) => {
                warn!(path = %task.path, "Deletion queue full, dropping external deletion");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Deletion queue closed");
            }
        }
    }

    fn is_claimed(&self, path: &Path) -> bool {
        claim_is_live(&self.claims, path, self.clock.now())
    }

    fn log_burst(&mut self) {
        if let Some(burst) = self.log.flush() {
            info!(
                project_id = %self.project_id,
                total = burst.total,
                changes = %burst.summary(),
                last = burst.last_path.as_deref().unwrap_or(""),
                "Disk changes"
            );
        }
    }
}

fn claim_is_live(claims: &Claims, path: &Path, now: DateTime<Utc>) -> bool {
    claims.iter().any(|claim| {
        path.starts_with(claim.key()) && now - *claim.value() < Duration::seconds(CLAIM_TTL_SECONDS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use projectfs_core::config::FolderPolicyConfig;
    use projectfs_core::traits::{Clock, ManualClock};
    use projectfs_database::MemoryProjectDirectory;
    use projectfs_entity::project::Project;
    use projectfs_storage::{DiskRoot, Scaffolder};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        clock: Arc<ManualClock>,
        watcher: DiskWatcher,
        project: Project,
        queue: mpsc::Receiver<DeletionTask>,
    }

    async fn fixture(config: WatcherConfig) -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let projects = Arc::new(MemoryProjectDirectory::new());
        let project = Project::new("25-10003", "Tower").with_client(ClientId::new());
        projects.upsert(project.clone()).await;
        let folders = FolderService::new(
            projects,
            Scaffolder::new(DiskRoot::new(dir.path(), "AU"), FolderPolicyConfig::default()),
        );
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (tx, queue) = mpsc::channel(8);
        let watcher = DiskWatcher::new(
            folders,
            config,
            clock.clone(),
            Some(tx),
            StdDuration::from_millis(50),
        );
        Fixture {
            _dir: dir,
            clock,
            watcher,
            project,
            queue,
        }
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let fx = fixture(WatcherConfig::default()).await;
        assert!(fx.watcher.start_watch(fx.project.id).await.expect("start"));
        assert!(fx.watcher.start_watch(fx.project.id).await.expect("start"));
        assert_eq!(fx.watcher.watched_count(), 1);
        assert!(fx.watcher.stop_watch(fx.project.id));
        assert!(!fx.watcher.stop_watch(fx.project.id));
    }

    #[tokio::test]
    async fn test_disabled_watcher_never_starts() {
        let fx = fixture(WatcherConfig {
            enabled: false,
            ..WatcherConfig::default()
        })
        .await;
        assert!(!fx.watcher.start_watch(fx.project.id).await.expect("start"));
        assert!(!fx.watcher.is_watching(fx.project.id));
        let waited = fx
            .watcher
            .wait_for_change(fx.project.id, StdDuration::from_secs(5))
            .await
            .expect("wait");
        assert!(waited.is_none());
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let fx = fixture(WatcherConfig::default()).await;
        let err = fx.watcher.start_watch(ProjectId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sweep_evicts_idle_watches_only() {
        let fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        fx.watcher.start_watch(id).await.expect("start");

        fx.clock.advance(Duration::minutes(4));
        assert!(fx.watcher.sweep().is_empty());
        assert!(fx.watcher.touch(id));

        fx.clock.advance(Duration::minutes(4));
        assert!(fx.watcher.sweep().is_empty());

        fx.clock.advance(Duration::minutes(2));
        assert_eq!(fx.watcher.sweep(), vec![id]);
        assert!(!fx.watcher.is_watching(id));
        assert!(!fx.watcher.touch(id));
    }

    #[tokio::test]
    async fn test_disk_change_keeps_watch_alive() {
        let fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        let mut rx = fx.watcher.subscribe();
        fx.watcher.start_watch(id).await.expect("start");
        let root = fx.watcher.watched()[0].root.clone();

        fx.clock.advance(Duration::minutes(4));
        tokio::fs::write(root.join("busy.txt"), b"draft").await.expect("write");
        tokio::time::timeout(StdDuration::from_secs(10), async {
            loop {
                if rx.recv().await.expect("recv").relative_path == "busy.txt" {
                    return;
                }
            }
        })
        .await
        .expect("change within timeout");
        let stamped = fx.watcher.watched()[0].last_activity;
        assert!(fx.clock.now() - stamped < Duration::seconds(1));

        fx.clock.advance(Duration::minutes(2));
        assert!(fx.watcher.sweep().is_empty());
        assert!(fx.watcher.is_watching(id));

        fx.clock.advance(Duration::minutes(4));
        assert_eq!(fx.watcher.sweep(), vec![id]);
    }

    #[tokio::test]
    async fn test_file_creation_reaches_subscribers() {
        let fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        let mut rx = fx.watcher.subscribe();
        fx.watcher.start_watch(id).await.expect("start");
        let root = fx.watcher.watched()[0].root.clone();

        tokio::fs::write(root.join("site.txt"), b"hello").await.expect("write");

        let change = tokio::time::timeout(StdDuration::from_secs(10), async {
            loop {
                let change = rx.recv().await.expect("recv");
                if change.relative_path == "site.txt" {
                    return change;
                }
            }
        })
        .await
        .expect("change within timeout");
        assert_eq!(change.project_id, id);
        assert_eq!(change.file_name, "site.txt");
        assert!(matches!(
            change.action_type,
            ChangeAction::FileAdded | ChangeAction::FileModified
        ));
    }

    #[tokio::test]
    async fn test_external_removal_is_queued() {
        let mut fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        fx.watcher.start_watch(id).await.expect("start");
        let root = fx.watcher.watched()[0].root.clone();
        let victim = root.join("old.txt");
        tokio::fs::write(&victim, b"x").await.expect("write");
        tokio::time::sleep(StdDuration::from_millis(200)).await;

        tokio::fs::remove_file(&victim).await.expect("rm");

        let task = tokio::time::timeout(StdDuration::from_secs(10), fx.queue.recv())
            .await
            .expect("queued within timeout")
            .expect("task");
        assert_eq!(task.project_id, id);
        assert_eq!(Some(task.client_id), fx.project.client_id);
        assert!(task.path.ends_with("old.txt"));
        assert!(!task.is_folder);
    }

    #[tokio::test]
    async fn test_claimed_removal_is_not_queued() {
        let mut fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        let mut rx = fx.watcher.subscribe();
        fx.watcher.start_watch(id).await.expect("start");
        let root = fx.watcher.watched()[0].root.clone();
        let victim = root.join("claimed.txt");
        tokio::fs::write(&victim, b"x").await.expect("write");
        tokio::time::sleep(StdDuration::from_millis(200)).await;

        fx.watcher.claim_removal(&victim);
        tokio::fs::remove_file(&victim).await.expect("rm");

        tokio::time::timeout(StdDuration::from_secs(10), async {
            loop {
                let change = rx.recv().await.expect("recv");
                if change.action_type == ChangeAction::FileRemoved {
                    return;
                }
            }
        })
        .await
        .expect("removal forwarded");
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        assert!(fx.queue.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_released_claim_queues_removal_again() {
        let mut fx = fixture(WatcherConfig::default()).await;
        let id = fx.project.id;
        fx.watcher.start_watch(id).await.expect("start");
        let root = fx.watcher.watched()[0].root.clone();
        let victim = root.join("kept.txt");
        tokio::fs::write(&victim, b"x").await.expect("write");
        tokio::time::sleep(StdDuration::from_millis(200)).await;

        fx.watcher.claim_removal(&victim);
        assert!(fx.watcher.is_claimed(&victim));
        fx.watcher.release_claim(&victim);
        assert!(!fx.watcher.is_claimed(&victim));

        tokio::fs::remove_file(&victim).await.expect("rm");
        let task = tokio::time::timeout(StdDuration::from_secs(10), fx.queue.recv())
            .await
            .expect("queued within timeout")
            .expect("task");
        assert!(task.path.ends_with("kept.txt"));
    }

    #[tokio::test]
    async fn test_claim_expires() {
        let fx = fixture(WatcherConfig::default()).await;
        let path = fx._dir.path().join("gone.txt");
        fx.watcher.claim_removal(&path);
        assert!(fx.watcher.is_claimed(&path.join("child.txt")));
        fx.clock.advance(Duration::seconds(CLAIM_TTL_SECONDS + 1));
        assert!(!fx.watcher.is_claimed(&path));
    }
}
