//! Recycle bin lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientId, ProjectId, RecycleItemId};

/// Which lifecycle transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecycleBinEventKind {
    /// Content was moved into the bin.
    FileDeleted,
    /// Content was moved back out.
    FileRestored,
    /// Content was destroyed.
    FilePermanentlyDeleted,
}

impl RecycleBinEventKind {
    /// Event name as published to subscribers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileDeleted => "file_deleted",
            Self::FileRestored => "file_restored",
            Self::FilePermanentlyDeleted => "file_permanently_deleted",
        }
    }
}

/// Published on every recycle bin state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinEvent {
    /// Transition kind.
    pub event: RecycleBinEventKind,
    /// Affected item.
    pub item_id: RecycleItemId,
    /// Owning client.
    pub client_id: ClientId,
    /// Owning project, when known.
    pub project_id: Option<ProjectId>,
    /// Display name of the content.
    pub file_name: String,
    /// Where the content lived before deletion.
    pub original_path: String,
    /// Acting user.
    pub user_id: String,
    /// Transition time.
    pub timestamp: DateTime<Utc>,
}
