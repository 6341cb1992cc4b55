//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use projectfs_core::error::AppError;
use projectfs_core::types::RecycleItemId;

/// Run `validator` rules and map failures to a validation error.
pub fn validated<T: Validate>(request: T) -> Result<T, AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;
    Ok(request)
}

/// Optional region override on project folder routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionQuery {
    /// Region code; the project's own or the default when absent.
    pub region: Option<String>,
}

impl RegionQuery {
    /// The region as a borrowed option.
    pub fn as_deref(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.trim().is_empty())
    }
}

/// Long-poll parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchDiskQuery {
    /// Seconds to wait; capped at the configured timeout.
    pub timeout: Option<u64>,
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Parent folder relative to the project root; empty for the root.
    #[serde(default)]
    pub parent_path: String,
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub folder_name: String,
}

/// Rename folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameFolderRequest {
    /// New name in the same parent.
    #[validate(length(min = 1, max = 255, message = "New name is required"))]
    pub new_name: String,
}

/// Delete query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteQuery {
    /// Recorded deletion reason.
    pub reason: Option<String>,
}

/// Zip download request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DownloadZipRequest {
    /// Entries relative to the project root.
    #[validate(length(min = 1, message = "Select at least one entry"))]
    pub paths: Vec<String>,
    /// Archive file name.
    pub file_name: Option<String>,
}

/// Project relocation hook body: the identifiers before the update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RelocateRequest {
    /// Project number before the update.
    #[validate(length(min = 1))]
    pub previous_project_number: String,
    /// Project name before the update.
    #[validate(length(min = 1))]
    pub previous_name: String,
    /// Region before the update.
    pub previous_region: Option<String>,
}

/// Restore request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreItemRequest {
    /// Alternate destination inside the project disk.
    pub restore_path: Option<String>,
}

/// Bulk restore request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkRestoreRequest {
    /// Items to restore.
    #[validate(length(min = 1, message = "No items selected"))]
    pub ids: Vec<RecycleItemId>,
}

/// Permanent delete request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PermanentDeleteRequest {
    /// Items to destroy; ignored on the single-item route.
    #[serde(default)]
    pub ids: Vec<RecycleItemId>,
    /// Recorded reason.
    pub reason: Option<String>,
}
