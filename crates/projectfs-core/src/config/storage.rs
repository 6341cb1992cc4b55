//! Project disk root configuration.

use serde::{Deserialize, Serialize};

/// Where project folders live on disk.
///
/// The production mount is probed once at startup; when it is not a
/// directory the development root is used instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Production mount point (e.g. a network share).
    #[serde(default = "default_production_root")]
    pub production_root: String,
    /// Local fallback used when the production mount is absent.
    #[serde(default = "default_development_root")]
    pub development_root: String,
    /// Region used when neither the request nor the project names one.
    #[serde(default = "default_region")]
    pub default_region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            production_root: default_production_root(),
            development_root: default_development_root(),
            default_region: default_region(),
        }
    }
}

fn default_production_root() -> String {
    "/mnt/projects".to_string()
}

fn default_development_root() -> String {
    "./data/projects".to_string()
}

fn default_region() -> String {
    "AU".to_string()
}
