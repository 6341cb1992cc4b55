//! # projectfs-api
//!
//! HTTP API layer for projectfs built on Axum.
//!
//! Provides the project folder and recycle bin endpoints, the WebSocket
//! upgrade, request logging and CORS middleware, extractors, DTOs, and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
