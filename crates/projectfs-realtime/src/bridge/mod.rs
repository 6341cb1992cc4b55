//! Domain events to WebSocket channels.

pub mod event_bridge;

pub use event_bridge::EventBridge;
