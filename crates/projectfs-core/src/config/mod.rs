//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so an empty file yields
//! a runnable development configuration.

pub mod app;
pub mod database;
pub mod folders;
pub mod logging;
pub mod realtime;
pub mod recycle_bin;
pub mod storage;
pub mod watcher;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::DatabaseConfig;
pub use self::folders::{FolderPolicyConfig, FolderRule};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::recycle_bin::RecycleBinConfig;
pub use self::storage::StorageConfig;
pub use self::watcher::WatcherConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Project disk roots.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Access-controlled project subfolders.
    #[serde(default)]
    pub folders: FolderPolicyConfig,
    /// Recycle bin retention and size policy.
    #[serde(default)]
    pub recycle_bin: RecycleBinConfig,
    /// Disk watcher settings.
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `PROJECTFS__`. The flat
    /// `RECYCLE_BIN_PATH` and `ENABLE_WATCHERS` variables are honored last.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PROJECTFS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let mut loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(loaded)
    }

    /// Apply the flat legacy environment overrides using `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RECYCLE_BIN_PATH").filter(|p| !p.trim().is_empty()) {
            self.recycle_bin.path = path;
        }

        if let Some(raw) = lookup("ENABLE_WATCHERS") {
            self.watcher.enabled = parse_flag(&raw).ok_or_else(|| {
                AppError::configuration(format!("ENABLE_WATCHERS must be a boolean, got '{raw}'"))
            })?;
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
