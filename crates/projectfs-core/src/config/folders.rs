//! Access-controlled project subfolder policy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scaffolded subfolder and the roles permitted to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRule {
    /// Folder name created under the project root.
    pub name: String,
    /// Roles allowed to access the folder.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl FolderRule {
    /// Create a rule.
    pub fn new(name: &str, roles: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// The ordered folder policy written into every root `.meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderPolicyConfig {
    /// Ordered list of access rules; order defines `structure`.
    #[serde(default = "default_access")]
    pub access: Vec<FolderRule>,
}

impl Default for FolderPolicyConfig {
    fn default() -> Self {
        Self {
            access: default_access(),
        }
    }
}

impl FolderPolicyConfig {
    /// Folder name to roles map, as stored in `allowedRoles`.
    pub fn allowed_roles(&self) -> BTreeMap<String, Vec<String>> {
        self.access
            .iter()
            .map(|rule| (rule.name.clone(), rule.roles.clone()))
            .collect()
    }

    /// Canonical subfolder names in policy order, as stored in `structure`.
    pub fn structure(&self) -> Vec<String> {
        self.access.iter().map(|rule| rule.name.clone()).collect()
    }
}

fn default_access() -> Vec<FolderRule> {
    vec![
        FolderRule::new("Project", &["Admin", "User"]),
        FolderRule::new("Admin", &["Admin"]),
        FolderRule::new("Estimator", &["Estimator"]),
    ]
}
