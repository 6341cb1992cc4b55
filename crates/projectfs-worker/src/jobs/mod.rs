//! Built-in job handler implementations.

pub mod cleanup;
pub mod sweep;

pub use cleanup::RecycleBinCleanupJob;
pub use sweep::WatcherSweepJob;
