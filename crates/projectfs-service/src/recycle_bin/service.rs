//! Recycle bin service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use sqlx::types::Json;
use tokio::fs;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use projectfs_core::config::RecycleBinConfig;
use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::events::{RecycleBinEvent, RecycleBinEventKind};
use projectfs_core::result::AppResult;
use projectfs_core::traits::SharedClock;
use projectfs_core::types::{ClientId, Pagination, RecycleItemId};
use projectfs_database::RecycleBinRepository;
use projectfs_entity::recycle_bin::{
    AuditAction, CleanupReason, FileType, ItemMetadata, ItemQuery, RecycleBinItem,
};
use projectfs_storage::ThumbnailGenerator;
use projectfs_storage::transfer::{self, move_path, remove_path, unique_restore_path};

use super::types::{
    BulkRestoreOutcome, InterceptOutcome, InterceptRequest, ItemFailure, ItemListing,
    ListRequest, ListedItem, PurgeOutcome, RestoreOutcome, RestoreRequest, SummaryView,
};

/// Moves deleted content into a dated, client-partitioned holding area and
/// manages its lifecycle.
#[derive(Clone)]
pub struct RecycleBinService {
    /// Item persistence.
    repo: Arc<dyn RecycleBinRepository>,
    /// Retention and size policy.
    config: RecycleBinConfig,
    /// Holding area root.
    bin_root: PathBuf,
    /// Preview generator writing below `{bin_root}/thumbnails`.
    thumbnails: ThumbnailGenerator,
    /// Time source.
    clock: SharedClock,
    /// Lifecycle event fan-out.
    events: broadcast::Sender<RecycleBinEvent>,
}

impl std::fmt::Debug for RecycleBinService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecycleBinService")
            .field("bin_root", &self.bin_root)
            .field("max_total_size", &self.config.max_total_size)
            .finish()
    }
}

impl RecycleBinService {
    /// Creates a new recycle bin service.
    pub fn new(
        repo: Arc<dyn RecycleBinRepository>,
        config: RecycleBinConfig,
        clock: SharedClock,
        event_buffer: usize,
    ) -> Self {
        let bin_root = PathBuf::from(&config.path);
        let thumbnails = ThumbnailGenerator::new(bin_root.join("thumbnails"), config.thumbnail_size);
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            repo,
            config,
            bin_root,
            thumbnails,
            clock,
            events,
        }
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<RecycleBinEvent> {
        self.events.subscribe()
    }

    /// The holding area root.
    pub fn bin_root(&self) -> &Path {
        &self.bin_root
    }

    /// The active policy.
    pub fn config(&self) -> &RecycleBinConfig {
        &self.config
    }

    pub(crate) fn repo(&self) -> &Arc<dyn RecycleBinRepository> {
        &self.repo
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move `original` into the bin and record it.
    ///
    /// Size caps are checked before anything moves. Thumbnailing happens
    /// after the record is stored and never fails the call.
    pub async fn intercept(
        &self,
        original: &Path,
        request: InterceptRequest,
    ) -> AppResult<InterceptOutcome> {
        let stat = fs::symlink_metadata(original).await.map_err(|e| {
            AppError::io(format!("Cannot recycle {}", original.display()), e)
        })?;
        let file_type = if stat.is_dir() {
            FileType::Folder
        } else {
            FileType::File
        };
        let size = match file_type {
            FileType::Folder => transfer::path_size(original).await?,
            FileType::File => stat.len(),
        };

        if file_type == FileType::File && size > self.config.max_file_size {
            return Err(AppError::storage_limit(format!(
                "{} is {size} bytes, over the per-file limit of {} bytes",
                original.display(),
                self.config.max_file_size
            )));
        }
        let in_use = self.repo.total_active_size().await?;
        if in_use.saturating_add(size) > self.config.max_total_size {
            return Err(AppError::storage_limit(format!(
                "Recycle bin holds {in_use} bytes; adding {size} would exceed {} bytes",
                self.config.max_total_size
            )));
        }

        let file_name = original
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::validation("Cannot recycle a path without a file name"))?;
        let now = self.now();
        let (target, stamp) = self.holding_path(request.client_id, &file_name, now).await;

        move_path(original, &target).await?;

        let mut item = RecycleBinItem {
            id: RecycleItemId::new(),
            original_path: original.to_string_lossy().into_owned(),
            file_name: file_name.clone(),
            file_type,
            file_size: i64::try_from(size).unwrap_or(i64::MAX),
            client_id: request.client_id,
            project_id: request.project_id,
            deleted_at: now,
            deleted_by: request.deleted_by.clone(),
            deletion_reason: request.deletion_reason.clone(),
            deletion_method: request.deletion_method.clone(),
            recycle_bin_path: target.to_string_lossy().into_owned(),
            can_restore: true,
            expires_at: now + Duration::days(self.config.max_retention_days),
            restored_at: None,
            restored_by: None,
            permanently_deleted_at: None,
            cleanup_reason: None,
            metadata: Json(ItemMetadata {
                extension: extension_of(&file_name),
                ..ItemMetadata::default()
            }),
            audit_log: Json(Vec::new()),
        };
        item.record(
            AuditAction::Deleted,
            &request.user_id,
            now,
            serde_json::json!({
                "reason": request.deletion_reason,
                "method": request.deletion_method,
            }),
        );

        if let Err(e) = self.repo.insert(&item).await {
            warn!(item_id = %item.id, error = %e, "Failed to record recycled item, moving content back");
            if let Err(undo) = move_path(&target, original).await {
                warn!(path = %target.display(), error = %undo, "Content left in recycle bin without a record");
            }
            return Err(e);
        }

        info!(
            item_id = %item.id,
            client_id = %item.client_id,
            original = %item.original_path,
            size,
            method = %item.deletion_method,
            "Content moved to recycle bin"
        );

        if file_type == FileType::File && ThumbnailGenerator::is_supported(&file_name) {
            self.attach_thumbnail(&mut item, &target, stamp).await;
        }

        self.publish(RecycleBinEventKind::FileDeleted, &item, &request.user_id, now);

        Ok(InterceptOutcome {
            recycle_bin_id: item.id,
            recycle_bin_path: item.recycle_bin_path,
            expires_at: item.expires_at,
        })
    }

    /// Move an item back out of the bin.
    ///
    /// An occupied destination gets a `_restored_{n}` suffix. I/O failures
    /// leave the item untouched.
    pub async fn restore(
        &self,
        id: RecycleItemId,
        request: RestoreRequest,
    ) -> AppResult<RestoreOutcome> {
        let mut item = self.find_active(id).await?;

        let requested = request
            .restore_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&item.original_path);
        let mut target = PathBuf::from(requested);
        if fs::try_exists(&target).await.unwrap_or(false) {
            target = unique_restore_path(&target, item.file_type == FileType::Folder).await;
        }

        let source = PathBuf::from(&item.recycle_bin_path);
        if let Err(e) = move_path(&source, &target).await {
            warn!(item_id = %id, error = %e, "Restore failed, item left in recycle bin");
            return Err(e);
        }

        let thumbnail = item.metadata.0.thumbnail_path.clone();
        let now = self.now();
        let restored_path = target.to_string_lossy().into_owned();
        item.mark_restored(&request.user_id, &restored_path, now)?;
        if !self.repo.transition(&item).await? {
            return Err(AppError::conflict(format!(
                "Recycle bin item {id} changed state during restore"
            )));
        }

        if let Some(thumb) = thumbnail {
            self.drop_thumbnail(&thumb).await;
        }

        info!(item_id = %id, to = %restored_path, user = %request.user_id, "Item restored");
        self.publish(RecycleBinEventKind::FileRestored, &item, &request.user_id, now);

        Ok(RestoreOutcome {
            id,
            restored_path,
            original_path: item.original_path,
        })
    }

    /// Restore several items, one at a time.
    pub async fn restore_bulk(
        &self,
        ids: &[RecycleItemId],
        user_id: &str,
    ) -> BulkRestoreOutcome {
        let mut outcome = BulkRestoreOutcome::default();
        for &id in ids {
            let request = RestoreRequest {
                user_id: user_id.to_string(),
                restore_path: None,
            };
            match self.restore(id, request).await {
                Ok(done) => outcome.restored.push(done),
                Err(e) => outcome.failures.push(failure(id, &e)),
            }
        }
        outcome
    }

    /// Destroy one active item. Returns the bytes released.
    pub async fn purge_item(
        &self,
        id: RecycleItemId,
        user_id: &str,
        reason: &str,
        cleanup: Option<CleanupReason>,
    ) -> AppResult<u64> {
        let mut item = self.find_active(id).await?;
        let content = PathBuf::from(&item.recycle_bin_path);
        match remove_path(&content).await {
            Ok(()) => {}
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(item_id = %id, path = %content.display(), "Recycled content already gone");
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Permanent delete failed, item left active");
                return Err(e);
            }
        }

        let thumbnail = item.metadata.0.thumbnail_path.clone();
        let now = self.now();
        item.mark_permanently_deleted(user_id, reason, cleanup, now)?;
        if !self.repo.transition(&item).await? {
            return Err(AppError::conflict(format!(
                "Recycle bin item {id} changed state during permanent delete"
            )));
        }
        if let Some(thumb) = thumbnail {
            self.drop_thumbnail(&thumb).await;
        }

        debug!(item_id = %id, reason, "Item permanently deleted");
        self.publish(RecycleBinEventKind::FilePermanentlyDeleted, &item, user_id, now);
        Ok(item.size_bytes())
    }

    /// Destroy several items. Failures are reported per item.
    pub async fn permanently_delete(
        &self,
        ids: &[RecycleItemId],
        user_id: &str,
        reason: &str,
    ) -> PurgeOutcome {
        let mut outcome = PurgeOutcome::default();
        for &id in ids {
            match self.purge_item(id, user_id, reason, None).await {
                Ok(freed) => {
                    outcome.deleted_count += 1;
                    outcome.total_size_freed += freed;
                }
                Err(e) => outcome.failures.push(failure(id, &e)),
            }
        }
        info!(
            deleted = outcome.deleted_count,
            freed = outcome.total_size_freed,
            failed = outcome.failures.len(),
            "Permanent delete finished"
        );
        outcome
    }

    /// One page of active items with summary.
    pub async fn list_items(
        &self,
        client_id: Option<ClientId>,
        request: ListRequest,
    ) -> AppResult<ItemListing> {
        let query = ItemQuery {
            client_id,
            file_type: request.file_type,
            search: request.search,
            sort_by: request.sort_by,
            sort_order: request.sort_order,
            page: request.page,
        };
        let (items, total) = self.repo.list_active(&query).await?;
        let summary = self.repo.active_summary(client_id).await?;
        let now = self.now();
        Ok(ItemListing {
            items: items.into_iter().map(|i| ListedItem::new(i, now)).collect(),
            pagination: Pagination::new(request.page, total),
            summary: summary.into(),
        })
    }

    /// Aggregates over active items.
    pub async fn summary(&self, client_id: Option<ClientId>) -> AppResult<SummaryView> {
        Ok(self.repo.active_summary(client_id).await?.into())
    }

    /// Fetch an item regardless of state.
    pub async fn get_item(&self, id: RecycleItemId) -> AppResult<RecycleBinItem> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recycle bin item {id} not found")))
    }

    async fn find_active(&self, id: RecycleItemId) -> AppResult<RecycleBinItem> {
        let item = self.get_item(id).await?;
        if !item.is_active() {
            return Err(AppError::conflict(format!(
                "Recycle bin item {id} is {:?} and can no longer change",
                item.status()
            )));
        }
        Ok(item)
    }

    /// `{bin}/YYYY/MM/DD/client_{id}/{millis}_{name}`, bumping the stamp on
    /// collision.
    async fn holding_path(
        &self,
        client_id: ClientId,
        file_name: &str,
        now: DateTime<Utc>,
    ) -> (PathBuf, i64) {
        let dir = self
            .bin_root
            .join(format!("{:04}", now.year()))
            .join(format!("{:02}", now.month()))
            .join(format!("{:02}", now.day()))
            .join(format!("client_{client_id}"));
        let mut stamp = now.timestamp_millis();
        loop {
            let candidate = dir.join(format!("{stamp}_{file_name}"));
            if !fs::try_exists(&candidate).await.unwrap_or(false) {
                return (candidate, stamp);
            }
            stamp += 1;
        }
    }

    async fn attach_thumbnail(&self, item: &mut RecycleBinItem, content: &Path, stamp: i64) {
        match self.thumbnails.generate(content, item.client_id, stamp).await {
            Ok(thumb) => {
                item.metadata.0.thumbnail_path = Some(thumb.to_string_lossy().into_owned());
                if let Err(e) = self.repo.update_metadata(item.id, &item.metadata.0).await {
                    warn!(item_id = %item.id, error = %e, "Failed to store thumbnail path");
                }
            }
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "Thumbnail generation failed");
            }
        }
    }

    async fn drop_thumbnail(&self, path: &str) {
        if let Err(e) = self.thumbnails.remove(Path::new(path)).await {
            warn!(thumbnail = path, error = %e, "Failed to remove thumbnail");
        }
    }

    fn publish(
        &self,
        kind: RecycleBinEventKind,
        item: &RecycleBinItem,
        user_id: &str,
        at: DateTime<Utc>,
    ) {
        let event = RecycleBinEvent {
            event: kind,
            item_id: item.id,
            client_id: item.client_id,
            project_id: item.project_id,
            file_name: item.file_name.clone(),
            original_path: item.original_path.clone(),
            user_id: user_id.to_string(),
            timestamp: at,
        };
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

pub(crate) fn failure(id: RecycleItemId, e: &AppError) -> ItemFailure {
    ItemFailure {
        id,
        error: e.kind.to_string(),
        message: e.message.clone(),
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use projectfs_core::traits::{Clock, ManualClock};
    use projectfs_database::MemoryRecycleBinRepository;
    use projectfs_entity::recycle_bin::ItemStatus;
    use tempfile::TempDir;

    pub(crate) struct Fixture {
        pub dir: TempDir,
        pub repo: Arc<MemoryRecycleBinRepository>,
        pub clock: Arc<ManualClock>,
        pub service: RecycleBinService,
    }

    pub(crate) fn fixture_with(configure: impl FnOnce(&mut RecycleBinConfig)) -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let mut config = RecycleBinConfig {
            path: dir.path().join("bin").to_string_lossy().into_owned(),
            ..RecycleBinConfig::default()
        };
        configure(&mut config);
        let repo = Arc::new(MemoryRecycleBinRepository::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).single().expect("date"),
        ));
        let service = RecycleBinService::new(repo.clone(), config, clock.clone(), 16);
        Fixture {
            dir,
            repo,
            clock,
            service,
        }
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_with(|_| {})
    }

    pub(crate) fn request(client_id: ClientId) -> InterceptRequest {
        InterceptRequest {
            client_id,
            project_id: None,
            user_id: "u-1".into(),
            deleted_by: "alice".into(),
            deletion_reason: "user_action".into(),
            deletion_method: "ui".into(),
        }
    }

    pub(crate) async fn write_file(path: &Path, bytes: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.expect("mkdir");
        }
        fs::write(path, vec![b'x'; bytes]).await.expect("write");
    }

    #[tokio::test]
    async fn test_intercept_moves_into_dated_client_partition() {
        let fx = fixture();
        let client = ClientId::new();
        let original = fx.dir.path().join("proj/Admin/plan.pdf");
        write_file(&original, 10).await;
        let mut events = fx.service.subscribe();

        let outcome = fx
            .service
            .intercept(&original, request(client))
            .await
            .expect("intercept");

        assert!(!original.exists());
        let held = PathBuf::from(&outcome.recycle_bin_path);
        assert!(held.exists());
        let expected_dir = fx
            .service
            .bin_root()
            .join("2025/03/14")
            .join(format!("client_{client}"));
        assert_eq!(held.parent(), Some(expected_dir.as_path()));
        assert!(
            held.file_name()
                .map(|n| n.to_string_lossy().ends_with("_plan.pdf"))
                .unwrap_or(false)
        );
        assert_eq!(outcome.expires_at - fx.clock.now(), Duration::days(7));

        let stored = fx.service.get_item(outcome.recycle_bin_id).await.expect("item");
        assert_eq!(stored.file_size, 10);
        assert_eq!(stored.metadata.0.extension.as_deref(), Some("pdf"));
        assert_eq!(stored.audit_log.0.len(), 1);

        let event = events.try_recv().expect("event");
        assert_eq!(event.event, RecycleBinEventKind::FileDeleted);
        assert_eq!(event.file_name, "plan.pdf");
    }

    #[tokio::test]
    async fn test_intercept_rejects_oversized_file_before_moving() {
        let fx = fixture_with(|c| c.max_file_size = 4);
        let original = fx.dir.path().join("big.bin");
        write_file(&original, 5).await;

        let err = fx
            .service
            .intercept(&original, request(ClientId::new()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::StorageLimitExceeded);
        assert!(original.exists());
        assert!(fx.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_intercept_rejects_when_bin_is_full() {
        let fx = fixture_with(|c| c.max_total_size = 15);
        let client = ClientId::new();
        let first = fx.dir.path().join("a.txt");
        let second = fx.dir.path().join("b.txt");
        write_file(&first, 10).await;
        write_file(&second, 10).await;

        fx.service.intercept(&first, request(client)).await.expect("first");
        let err = fx
            .service
            .intercept(&second, request(client))
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::StorageLimitExceeded));
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_intercept_missing_path_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .intercept(&fx.dir.path().join("gone.txt"), request(ClientId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_intercept_folder_records_recursive_size() {
        let fx = fixture();
        let folder = fx.dir.path().join("proj/Quotes");
        write_file(&folder.join("a.txt"), 3).await;
        write_file(&folder.join("nested/b.txt"), 4).await;

        let outcome = fx
            .service
            .intercept(&folder, request(ClientId::new()))
            .await
            .expect("intercept");
        let item = fx.service.get_item(outcome.recycle_bin_id).await.expect("item");
        assert_eq!(item.file_type, FileType::Folder);
        assert_eq!(item.file_size, 7);
        assert!(PathBuf::from(&item.recycle_bin_path).join("nested/b.txt").exists());
    }

    #[tokio::test]
    async fn test_restore_to_occupied_path_gets_suffix() {
        let fx = fixture();
        let original = fx.dir.path().join("docs/report.pdf");
        write_file(&original, 6).await;
        let outcome = fx
            .service
            .intercept(&original, request(ClientId::new()))
            .await
            .expect("intercept");
        write_file(&original, 2).await;

        let restored = fx
            .service
            .restore(
                outcome.recycle_bin_id,
                RestoreRequest {
                    user_id: "bob".into(),
                    restore_path: None,
                },
            )
            .await
            .expect("restore");

        let expected = fx.dir.path().join("docs/report_restored_1.pdf");
        assert_eq!(PathBuf::from(&restored.restored_path), expected);
        assert_eq!(fs::read(&expected).await.expect("read").len(), 6);
        assert_eq!(fs::read(&original).await.expect("read").len(), 2);

        let item = fx.service.get_item(outcome.recycle_bin_id).await.expect("item");
        assert_eq!(item.status(), ItemStatus::Restored);
        assert_eq!(item.restored_by.as_deref(), Some("bob"));
        assert!(!item.can_restore);
    }

    #[tokio::test]
    async fn test_terminal_states_are_exclusive() {
        let fx = fixture();
        let original = fx.dir.path().join("x.txt");
        write_file(&original, 1).await;
        let id = fx
            .service
            .intercept(&original, request(ClientId::new()))
            .await
            .expect("intercept")
            .recycle_bin_id;

        fx.service
            .restore(id, RestoreRequest::default())
            .await
            .expect("restore");
        let err = fx
            .service
            .purge_item(id, "admin", "manual", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let again = fx.service.restore(id, RestoreRequest::default()).await;
        assert!(again.is_err());
        let item = fx.service.get_item(id).await.expect("item");
        assert!(item.restored_at.is_some());
        assert!(item.permanently_deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_permanently_delete_reports_partial_failures() {
        let fx = fixture();
        let client = ClientId::new();
        let file = fx.dir.path().join("keep/one.txt");
        write_file(&file, 8).await;
        let id = fx
            .service
            .intercept(&file, request(client))
            .await
            .expect("intercept")
            .recycle_bin_id;
        let unknown = RecycleItemId::new();

        let outcome = fx
            .service
            .permanently_delete(&[id, unknown], "admin", "manual")
            .await;

        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.total_size_freed, 8);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, unknown);
        assert_eq!(outcome.failures[0].error, "NOT_FOUND");

        let item = fx.service.get_item(id).await.expect("item");
        assert_eq!(item.status(), ItemStatus::PermanentlyDeleted);
        assert!(!PathBuf::from(&item.recycle_bin_path).exists());
    }

    #[tokio::test]
    async fn test_purge_tolerates_missing_content() {
        let fx = fixture();
        let file = fx.dir.path().join("lost.txt");
        write_file(&file, 3).await;
        let outcome = fx
            .service
            .intercept(&file, request(ClientId::new()))
            .await
            .expect("intercept");
        fs::remove_file(&outcome.recycle_bin_path).await.expect("rm");

        let freed = fx
            .service
            .purge_item(outcome.recycle_bin_id, "system", "cleanup", None)
            .await
            .expect("purge");
        assert_eq!(freed, 3);
    }

    #[tokio::test]
    async fn test_image_gets_thumbnail_that_restore_removes() {
        let fx = fixture();
        let original = fx.dir.path().join("photos/site.png");
        fs::create_dir_all(original.parent().expect("parent"))
            .await
            .expect("mkdir");
        image::RgbImage::from_pixel(64, 32, image::Rgb([10, 200, 30]))
            .save(&original)
            .expect("png");

        let id = fx
            .service
            .intercept(&original, request(ClientId::new()))
            .await
            .expect("intercept")
            .recycle_bin_id;
        let thumb = fx
            .service
            .get_item(id)
            .await
            .expect("item")
            .metadata
            .0
            .thumbnail_path
            .expect("thumbnail");
        assert!(Path::new(&thumb).exists());

        fx.service
            .restore(id, RestoreRequest::default())
            .await
            .expect("restore");
        assert!(!Path::new(&thumb).exists());
        assert!(original.exists());
    }

    #[tokio::test]
    async fn test_list_items_scopes_to_client() {
        let fx = fixture();
        let (a, b) = (ClientId::new(), ClientId::new());
        for (i, client) in [a, a, b].into_iter().enumerate() {
            let path = fx.dir.path().join(format!("f{i}.txt"));
            write_file(&path, 5).await;
            fx.service.intercept(&path, request(client)).await.expect("intercept");
        }

        let listing = fx
            .service
            .list_items(Some(a), ListRequest::default())
            .await
            .expect("list");
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.pagination.total, 2);
        assert_eq!(listing.summary.summary.total_files, 2);
        assert_eq!(listing.summary.summary.total_size, 10);
        assert!(listing.items.iter().all(|i| i.days_until_expiry == 7));
    }
}
