//! Recycle bin item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use projectfs_core::AppError;
use projectfs_core::types::{ClientId, ProjectId, RecycleItemId};

use super::audit::{AuditAction, AuditEntry};
use super::status::{CleanupReason, FileType, ItemStatus};

/// Optional per-item metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// Generated preview for image files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Lowercase file extension, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Where restore actually put the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_path: Option<String>,
}

/// One deleted file or folder held in the recycle bin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinItem {
    /// Unique item identifier.
    pub id: RecycleItemId,
    /// Absolute path the content was deleted from.
    pub original_path: String,
    /// Final path component at deletion time.
    pub file_name: String,
    /// File or folder.
    pub file_type: FileType,
    /// Recursive size in bytes.
    pub file_size: i64,
    /// Owning client.
    pub client_id: ClientId,
    /// Owning project, if known.
    pub project_id: Option<ProjectId>,
    /// When the content entered the bin.
    pub deleted_at: DateTime<Utc>,
    /// Display name of the deleting actor.
    pub deleted_by: String,
    /// Why the content was deleted (e.g. `user_action`, `direct_delete`).
    pub deletion_reason: String,
    /// How the deletion was performed (e.g. `ui`, `filesystem_watch`).
    pub deletion_method: String,
    /// Where the content physically lives now.
    pub recycle_bin_path: String,
    /// Gate for restore and permanent delete.
    pub can_restore: bool,
    /// `deleted_at` plus the retention window.
    pub expires_at: DateTime<Utc>,
    /// Set once on restore.
    pub restored_at: Option<DateTime<Utc>>,
    /// Set once on restore.
    pub restored_by: Option<String>,
    /// Set once on permanent deletion.
    pub permanently_deleted_at: Option<DateTime<Utc>>,
    /// Set when scheduled cleanup destroyed the item.
    pub cleanup_reason: Option<CleanupReason>,
    /// Thumbnail and other extras.
    pub metadata: Json<ItemMetadata>,
    /// Append-only trail.
    pub audit_log: Json<Vec<AuditEntry>>,
}

impl RecycleBinItem {
    /// Current lifecycle state.
    pub fn status(&self) -> ItemStatus {
        if self.permanently_deleted_at.is_some() {
            ItemStatus::PermanentlyDeleted
        } else if self.restored_at.is_some() {
            ItemStatus::Restored
        } else if self.can_restore {
            ItemStatus::Active
        } else {
            // A cleared gate without a terminal stamp is treated as destroyed.
            ItemStatus::PermanentlyDeleted
        }
    }

    /// Whether the item is listed and restorable.
    pub fn is_active(&self) -> bool {
        self.status() == ItemStatus::Active
    }

    /// Whether the retention window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whole days left until expiry, never negative.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        let remaining = self.expires_at - now;
        if remaining <= chrono::Duration::zero() {
            return 0;
        }
        let days = remaining.num_days();
        if remaining > chrono::Duration::days(days) {
            days + 1
        } else {
            days
        }
    }

    /// Size in bytes as an unsigned value.
    pub fn size_bytes(&self) -> u64 {
        u64::try_from(self.file_size).unwrap_or(0)
    }

    /// Append an audit entry.
    pub fn record(
        &mut self,
        action: AuditAction,
        user_id: &str,
        at: DateTime<Utc>,
        details: serde_json::Value,
    ) {
        self.audit_log.0.push(AuditEntry {
            action,
            timestamp: at,
            user_id: user_id.to_string(),
            details,
        });
    }

    /// Transition `active -> restored`.
    pub fn mark_restored(
        &mut self,
        user_id: &str,
        restored_path: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.ensure_active()?;
        self.can_restore = false;
        self.restored_at = Some(at);
        self.restored_by = Some(user_id.to_string());
        self.metadata.0.restored_path = Some(restored_path.to_string());
        self.metadata.0.thumbnail_path = None;
        self.record(
            AuditAction::Restored,
            user_id,
            at,
            serde_json::json!({ "restoredPath": restored_path }),
        );
        Ok(())
    }

    /// Transition `active -> permanently_deleted`.
    pub fn mark_permanently_deleted(
        &mut self,
        user_id: &str,
        reason: &str,
        cleanup: Option<CleanupReason>,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.ensure_active()?;
        self.can_restore = false;
        self.permanently_deleted_at = Some(at);
        self.cleanup_reason = cleanup;
        self.metadata.0.thumbnail_path = None;
        self.record(
            AuditAction::PermanentlyDeleted,
            user_id,
            at,
            serde_json::json!({ "reason": reason }),
        );
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), AppError> {
        match self.status() {
            ItemStatus::Active => Ok(()),
            ItemStatus::Restored => Err(AppError::conflict(format!(
                "Recycle bin item {} has already been restored",
                self.id
            ))),
            ItemStatus::PermanentlyDeleted => Err(AppError::conflict(format!(
                "Recycle bin item {} has been permanently deleted",
                self.id
            ))),
        }
    }
}

/// Human-readable size, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
