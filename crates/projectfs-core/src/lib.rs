//! # projectfs-core
//!
//! Core crate for projectfs. Contains configuration schemas, typed
//! identifiers, disk and recycle bin events, the injectable clock,
//! pagination/sorting types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other projectfs crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
