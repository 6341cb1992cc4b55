//! Core type definitions used across the projectfs workspace.

pub mod id;
pub mod pagination;
pub mod sorting;

pub use id::*;
pub use pagination::{PageRequest, Pagination};
pub use sorting::SortOrder;
