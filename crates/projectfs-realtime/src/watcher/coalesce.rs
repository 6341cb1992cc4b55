//! Burst-friendly change logging.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use projectfs_core::events::ChangeAction;

/// Counts changes over a window so a burst produces one log line.
#[derive(Debug)]
pub struct LogCoalescer {
    window: Duration,
    opened_at: Option<Instant>,
    counts: HashMap<ChangeAction, u64>,
    last_path: Option<String>,
}

/// What a window saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescedBurst {
    /// Total changes.
    pub total: u64,
    /// Changes per action.
    pub by_action: Vec<(ChangeAction, u64)>,
    /// The most recent relative path.
    pub last_path: Option<String>,
}

impl LogCoalescer {
    /// Create a coalescer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            opened_at: None,
            counts: HashMap::new(),
            last_path: None,
        }
    }

    /// Count one change, opening a window if none is open.
    pub fn record(&mut self, action: ChangeAction, relative: &str) {
        if self.opened_at.is_none() {
            self.opened_at = Some(Instant::now());
        }
        *self.counts.entry(action).or_insert(0) += 1;
        self.last_path = Some(relative.to_string());
    }

    /// When the open window closes.
    pub fn deadline(&self) -> Option<Instant> {
        self.opened_at.map(|t| t + self.window)
    }

    /// Close the window and return what it saw.
    pub fn flush(&mut self) -> Option<CoalescedBurst> {
        self.opened_at.take()?;
        let mut by_action: Vec<(ChangeAction, u64)> = self.counts.drain().collect();
        by_action.sort_by_key(|(a, _)| a.as_str());
        Some(CoalescedBurst {
            total: by_action.iter().map(|(_, n)| n).sum(),
            by_action,
            last_path: self.last_path.take(),
        })
    }
}

impl CoalescedBurst {
    /// `fileAdded=3 folderAdded=1`.
    pub fn summary(&self) -> String {
        self.by_action
            .iter()
            .map(|(a, n)| format!("{a}={n}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
