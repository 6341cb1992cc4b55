//! # projectfs-realtime
//!
//! Live view of project folders. Provides:
//!
//! - A registry of per-project disk watchers with inactivity eviction
//! - Normalization of raw filesystem events into typed changes
//! - Hand-off of externally deleted content to the recycle bin worker
//! - WebSocket connection and channel fan-out for changes and recycle bin
//!   events

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod message;
pub mod server;
pub mod watcher;

pub use channel::registry::ChannelRegistry;
pub use connection::manager::ConnectionManager;
pub use server::RealtimeEngine;
pub use watcher::DiskWatcher;
