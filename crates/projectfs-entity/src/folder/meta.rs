//! The `.meta.json` sidecar descriptor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name of the sidecar descriptor.
pub const META_FILE_NAME: &str = ".meta.json";

/// Scratch file a descriptor is written to before it replaces the real one.
pub const META_TMP_FILE_NAME: &str = ".meta.json.tmp";

/// Whether `name` is the descriptor or its scratch file.
pub fn is_descriptor_name(name: &str) -> bool {
    name == META_FILE_NAME || name == META_TMP_FILE_NAME
}

/// Descriptor correlating a disk folder with a project.
///
/// Keys this type does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMeta {
    /// Project identifier as a string. Older descriptors may carry ids that
    /// are not UUIDs.
    pub project_id: String,
    /// Folder name to permitted roles.
    #[serde(default)]
    pub allowed_roles: BTreeMap<String, Vec<String>>,
    /// Canonical subfolder names in policy order.
    #[serde(default)]
    pub structure: Vec<String>,
    /// When the folder was scaffolded.
    pub created_at: DateTime<Utc>,
    /// Last descriptor rewrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Unknown keys preserved across rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FolderMeta {
    /// A fresh descriptor for `project_id`.
    pub fn new(
        project_id: impl Into<String>,
        allowed_roles: BTreeMap<String, Vec<String>>,
        structure: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            allowed_roles,
            structure,
            created_at,
            last_updated: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether this descriptor belongs to `project_id`.
    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id == project_id
    }
}
