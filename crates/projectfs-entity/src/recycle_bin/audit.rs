//! Append-only audit trail entries stored on each item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audited recycle bin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Content entered the bin.
    Deleted,
    /// Content was restored.
    Restored,
    /// Content was destroyed.
    PermanentlyDeleted,
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// What happened.
    pub action: AuditAction,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Who did it.
    pub user_id: String,
    /// Free-form context.
    #[serde(default)]
    pub details: serde_json::Value,
}
