//! Recycle bin enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a recycled entry was a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recycle_file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A plain file.
    File,
    /// A directory and everything below it.
    Folder,
}

impl FileType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why scheduled cleanup destroyed an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cleanup_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CleanupReason {
    /// The retention window elapsed.
    TimeLimit,
    /// Evicted oldest-first to get under the global size cap.
    SizeLimit,
}

impl CleanupReason {
    /// Return the reason as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeLimit => "time_limit",
            Self::SizeLimit => "size_limit",
        }
    }
}

impl fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state derived from an item's timestamps.
///
/// `Active` moves to exactly one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Restorable.
    Active,
    /// Moved back out of the bin.
    Restored,
    /// Destroyed.
    PermanentlyDeleted,
}

impl ItemStatus {
    /// Check if the item is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}
