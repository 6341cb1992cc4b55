//! Recycle bin entities.

pub mod audit;
pub mod model;
pub mod query;
pub mod status;

pub use audit::{AuditAction, AuditEntry};
pub use model::{ItemMetadata, RecycleBinItem, format_size};
pub use query::{ActiveSummary, ItemQuery, SortKey};
pub use status::{CleanupReason, FileType, ItemStatus};
