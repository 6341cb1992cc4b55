//! Listing query parameters for recycle bin endpoints.

use serde::Deserialize;

use projectfs_core::types::{PageRequest, SortOrder};
use projectfs_entity::recycle_bin::{FileType, SortKey};
use projectfs_service::recycle_bin::ListRequest;

/// Query parameters for paginated recycle bin listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Page number (1-based, default: 1).
    pub page: Option<u64>,
    /// Items per page (default: 20, max: 100).
    pub limit: Option<u64>,
    /// `file` or `folder`.
    pub file_type: Option<FileType>,
    /// `deletedAt`, `fileName`, `fileSize` or `expiresAt`.
    pub sort_by: Option<SortKey>,
    /// `asc` or `desc`.
    pub sort_order: Option<SortOrder>,
    /// Name or path substring.
    pub search: Option<String>,
}

impl ListParams {
    /// Converts to a service `ListRequest`, clamping the page.
    pub fn into_request(self) -> ListRequest {
        let defaults = PageRequest::default();
        ListRequest {
            page: PageRequest::new(
                self.page.unwrap_or(defaults.page),
                self.limit.unwrap_or(defaults.limit),
            ),
            file_type: self.file_type,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            search: self.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_and_defaults() {
        let request = ListParams {
            page: Some(0),
            limit: Some(1000),
            search: Some("  ".into()),
            ..ListParams::default()
        }
        .into_request();
        assert_eq!(request.page.page, 1);
        assert_eq!(request.page.limit, 100);
        assert!(request.search.is_none());
        assert_eq!(request.sort_by, SortKey::DeletedAt);
        assert_eq!(request.sort_order, SortOrder::Desc);
    }
}
