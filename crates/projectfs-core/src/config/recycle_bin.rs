//! Recycle bin retention and capacity configuration.

use serde::{Deserialize, Serialize};

/// Recycle bin policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycleBinConfig {
    /// Holding area root (`RECYCLE_BIN_PATH`).
    #[serde(default = "default_path")]
    pub path: String,
    /// Days an item stays restorable before scheduled cleanup removes it.
    #[serde(default = "default_retention_days")]
    pub max_retention_days: i64,
    /// Global cap on the total size of active items, in bytes.
    #[serde(default = "default_max_total_size")]
    pub max_total_size: u64,
    /// Cap on a single file, in bytes. Folders are only checked against the global cap.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Six-field cron expression for the cleanup job.
    #[serde(default = "default_cleanup_schedule")]
    pub cleanup_schedule: String,
    /// Longest edge of generated thumbnails, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Whether the cleanup job is registered at all.
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
}

impl Default for RecycleBinConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_retention_days: default_retention_days(),
            max_total_size: default_max_total_size(),
            max_file_size: default_max_file_size(),
            cleanup_schedule: default_cleanup_schedule(),
            thumbnail_size: default_thumbnail_size(),
            cleanup_enabled: true,
        }
    }
}

fn default_path() -> String {
    "./data/recycleBin".to_string()
}

fn default_retention_days() -> i64 {
    7
}

fn default_max_total_size() -> u64 {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100 MiB
}

fn default_cleanup_schedule() -> String {
    "0 0 2 * * *".to_string()
}

fn default_thumbnail_size() -> u32 {
    200
}

fn default_true() -> bool {
    true
}
