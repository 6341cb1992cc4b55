//! Request and outcome types for the recycle bin service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projectfs_core::types::{ClientId, PageRequest, Pagination, ProjectId, RecycleItemId, SortOrder};
use projectfs_entity::recycle_bin::{ActiveSummary, FileType, RecycleBinItem, SortKey, format_size};

/// Who deleted something, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptRequest {
    /// Owning client; selects the bin partition.
    pub client_id: ClientId,
    /// Owning project, if known.
    pub project_id: Option<ProjectId>,
    /// Acting user id for the audit trail.
    pub user_id: String,
    /// Display name stored on the item.
    pub deleted_by: String,
    /// Why (`user_action`, `direct_delete`, ...).
    pub deletion_reason: String,
    /// How (`ui`, `filesystem_watch`, ...).
    pub deletion_method: String,
}

/// Where intercepted content went.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptOutcome {
    /// New item id.
    pub recycle_bin_id: RecycleItemId,
    /// Holding path.
    pub recycle_bin_path: String,
    /// When cleanup will destroy it.
    pub expires_at: DateTime<Utc>,
}

/// Restore parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    /// Acting user.
    pub user_id: String,
    /// Alternate destination; defaults to the original path.
    #[serde(default)]
    pub restore_path: Option<String>,
}

/// Where restored content went.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    /// Restored item.
    pub id: RecycleItemId,
    /// Final location, possibly suffixed `_restored_{n}`.
    pub restored_path: String,
    /// Location at deletion time.
    pub original_path: String,
}

/// One item that a bulk operation could not process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    /// Item id.
    pub id: RecycleItemId,
    /// Error kind name.
    pub error: String,
    /// Error message.
    pub message: String,
}

/// Result of a bulk restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRestoreOutcome {
    /// Items that were restored.
    pub restored: Vec<RestoreOutcome>,
    /// Items that were skipped.
    pub failures: Vec<ItemFailure>,
}

/// Result of a permanent delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeOutcome {
    /// Items destroyed.
    pub deleted_count: u64,
    /// Bytes released.
    pub total_size_freed: u64,
    /// Items that were skipped.
    pub failures: Vec<ItemFailure>,
}

/// Result of one cleanup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Items removed because they expired.
    pub expired_deleted: u64,
    /// Items removed to get under the size cap.
    pub size_limit_deleted: u64,
    /// Bytes released by both passes.
    pub total_size_freed: u64,
    /// Active bytes after the run.
    pub remaining_size: u64,
    /// Items that could not be removed.
    pub failures: Vec<ItemFailure>,
}

/// Listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Page and size.
    pub page: PageRequest,
    /// Restrict to files or folders.
    pub file_type: Option<FileType>,
    /// Ordering column.
    pub sort_by: SortKey,
    /// Ordering direction.
    pub sort_order: SortOrder,
    /// Name or path substring.
    pub search: Option<String>,
}

/// An active item with display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedItem {
    /// The stored item.
    #[serde(flatten)]
    pub item: RecycleBinItem,
    /// Whole days until cleanup.
    pub days_until_expiry: i64,
    /// Size like `1.5 MB`.
    pub formatted_size: String,
}

impl ListedItem {
    /// Decorate `item` as seen at `now`.
    pub fn new(item: RecycleBinItem, now: DateTime<Utc>) -> Self {
        Self {
            days_until_expiry: item.days_until_expiry(now),
            formatted_size: format_size(item.size_bytes()),
            item,
        }
    }
}

/// Aggregates with a display size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    /// Raw aggregates.
    #[serde(flatten)]
    pub summary: ActiveSummary,
    /// Total size like `2 GB`.
    pub formatted_total_size: String,
}

impl From<ActiveSummary> for SummaryView {
    fn from(summary: ActiveSummary) -> Self {
        Self {
            formatted_total_size: format_size(summary.total_size),
            summary,
        }
    }
}

/// One page of active items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListing {
    /// Items on this page.
    pub items: Vec<ListedItem>,
    /// Page block.
    pub pagination: Pagination,
    /// Aggregates over every active item in scope.
    pub summary: SummaryView,
}
