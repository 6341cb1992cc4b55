//! Request handlers grouped by resource.

pub mod download;
pub mod folder;
pub mod health;
pub mod project;
pub mod recycle_bin;
pub mod ws;
