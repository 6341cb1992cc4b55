//! Listing filters and aggregate summaries over active items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projectfs_core::types::{ClientId, PageRequest, SortOrder};

use super::status::FileType;

/// Column an item listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Deletion time.
    #[default]
    DeletedAt,
    /// File name.
    FileName,
    /// Size in bytes.
    FileSize,
    /// Expiry time.
    ExpiresAt,
}

impl SortKey {
    /// The SQL column for this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::DeletedAt => "deleted_at",
            Self::FileName => "file_name",
            Self::FileSize => "file_size",
            Self::ExpiresAt => "expires_at",
        }
    }
}

/// Filter for listing active items.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    /// Restrict to one client.
    pub client_id: Option<ClientId>,
    /// Restrict to files or folders.
    pub file_type: Option<FileType>,
    /// Case-insensitive substring of the file name or original path.
    pub search: Option<String>,
    /// Ordering column.
    pub sort_by: SortKey,
    /// Ordering direction.
    pub sort_order: SortOrder,
    /// Page to return.
    pub page: PageRequest,
}

/// Aggregates over active items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSummary {
    /// Number of active items.
    pub total_files: u64,
    /// Sum of their sizes in bytes.
    pub total_size: u64,
    /// Active items that are files.
    pub file_count: u64,
    /// Active items that are folders.
    pub folder_count: u64,
    /// Earliest `deletedAt`.
    pub oldest_item: Option<DateTime<Utc>>,
    /// Latest `deletedAt`.
    pub newest_item: Option<DateTime<Utc>>,
}
