//! Pub/sub channels keyed by project or client.

pub mod registry;
pub mod subscription;
pub mod types;
