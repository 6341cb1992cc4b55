//! Project entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use projectfs_core::types::{ClientId, ProjectId};

/// A project as read from the `projects` table. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Owning client; required to partition the recycle bin.
    pub client_id: Option<ClientId>,
    /// Business number in `YY-MMNNN` form.
    pub project_number: String,
    /// Human label used verbatim in the folder name.
    pub name: String,
    /// Region code; `None` means the configured default.
    pub region: Option<String>,
}

impl Project {
    /// Build a project value (used by tests and the in-memory directory).
    pub fn new(project_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            client_id: None,
            project_number: project_number.into(),
            name: name.into(),
            region: None,
        }
    }

    /// Set the owning client.
    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The folder name under the month directory.
    pub fn folder_name(&self) -> String {
        format!("{} - {}", self.project_number, self.name)
    }
}
