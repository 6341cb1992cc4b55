//! Normalized filesystem change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// The kind of change observed under a project folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeAction {
    /// A file appeared.
    FileAdded,
    /// A file's content or metadata changed.
    FileModified,
    /// A file disappeared.
    FileRemoved,
    /// A directory appeared.
    FolderAdded,
    /// A directory disappeared.
    FolderRemoved,
}

impl ChangeAction {
    /// Whether this action reports something leaving the disk.
    pub fn is_removal(self) -> bool {
        matches!(self, Self::FileRemoved | Self::FolderRemoved)
    }

    /// The wire name used in notifications.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileAdded => "fileAdded",
            Self::FileModified => "fileModified",
            Self::FileRemoved => "fileRemoved",
            Self::FolderAdded => "folderAdded",
            Self::FolderRemoved => "folderRemoved",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change under a watched project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskChange {
    /// Project whose folder changed.
    pub project_id: ProjectId,
    /// What happened.
    pub action_type: ChangeAction,
    /// Absolute path of the changed entry.
    pub file_path: String,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    /// Final path component.
    pub file_name: String,
    /// When the watcher observed the change.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let change = DiskChange {
            project_id: ProjectId::new(),
            action_type: ChangeAction::FolderAdded,
            file_path: "/root/AU/2025/10. Oct/25-10003 - Tower/Admin".into(),
            relative_path: "Admin".into(),
            file_name: "Admin".into(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&change).expect("serialize");
        assert_eq!(value["actionType"], "folderAdded");
        assert_eq!(value["relativePath"], "Admin");
        assert!(value.get("projectId").is_some());
    }

    #[test]
    fn test_removal_actions() {
        assert!(ChangeAction::FileRemoved.is_removal());
        assert!(ChangeAction::FolderRemoved.is_removal());
        assert!(!ChangeAction::FileModified.is_removal());
    }
}
