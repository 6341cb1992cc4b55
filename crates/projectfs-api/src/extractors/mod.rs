//! Custom Axum extractors.

pub mod pagination;
pub mod path;
pub mod user;

pub use pagination::ListParams;
pub use user::ActingUser;
