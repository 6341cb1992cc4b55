//! WebSocket connection lifecycle.

pub mod handle;
pub mod manager;
