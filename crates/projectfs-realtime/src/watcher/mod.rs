//! Per-project disk watchers.
//!
//! One OS watch per project folder, shared by every subscriber. Raw
//! events are normalized into [`DiskChange`]s and broadcast; removals are
//! also queued for the recycle bin worker. Idle watches are retired by a
//! periodic sweep.
//!
//! [`DiskChange`]: projectfs_core::events::DiskChange

pub mod coalesce;
pub mod normalize;
pub mod service;

pub use coalesce::LogCoalescer;
pub use normalize::Normalizer;
pub use service::DiskWatcher;
