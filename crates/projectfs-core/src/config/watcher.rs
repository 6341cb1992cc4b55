//! Disk watcher configuration.

use serde::{Deserialize, Serialize};

/// Disk watcher and long-poll settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Master switch (`ENABLE_WATCHERS`). When false every start is a no-op
    /// and long-poll answers immediately with no change.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Idle seconds after which a watch is retired by the sweep.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_seconds: u64,
    /// Six-field cron expression for the sweep job.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
    /// Deepest relative path depth that produces change events.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Seconds the watch-disk long-poll waits before answering `changed: false`.
    #[serde(default = "default_long_poll_timeout")]
    pub long_poll_timeout_seconds: u64,
    /// Capacity of the watcher to recycle bin deletion queue.
    #[serde(default = "default_queue_capacity")]
    pub deletion_queue_capacity: usize,
    /// Capacity of the raw notify event buffer per project.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            inactivity_timeout_seconds: default_inactivity_timeout(),
            sweep_schedule: default_sweep_schedule(),
            max_depth: default_max_depth(),
            long_poll_timeout_seconds: default_long_poll_timeout(),
            deletion_queue_capacity: default_queue_capacity(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_inactivity_timeout() -> u64 {
    300
}

fn default_sweep_schedule() -> String {
    "0 * * * * *".to_string()
}

fn default_max_depth() -> usize {
    10
}

fn default_long_poll_timeout() -> u64 {
    120
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_event_buffer() -> usize {
    512
}
