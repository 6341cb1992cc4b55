//! Work items handed from the disk watcher to the recycle bin worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientId, ProjectId};

/// Deletion method recorded for watcher-detected removals.
pub const FILESYSTEM_WATCH: &str = "filesystem_watch";
/// Deletion reason recorded for watcher-detected removals.
pub const DIRECT_DELETE: &str = "direct_delete";
/// Acting user recorded for watcher-detected removals.
pub const SYSTEM_USER: &str = "system";

/// A confirmed external removal awaiting recycle bin processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionTask {
    /// Path that no longer stats.
    pub path: String,
    /// Owning client.
    pub client_id: ClientId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Whether the removed entry was a directory.
    pub is_folder: bool,
    /// When the removal was observed.
    pub detected_at: DateTime<Utc>,
}
