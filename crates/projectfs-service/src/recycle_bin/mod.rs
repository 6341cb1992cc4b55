//! Recycle bin lifecycle: intercept, restore, permanent delete, listing,
//! and scheduled cleanup.

pub mod cleanup;
pub mod service;
pub mod types;

pub use service::RecycleBinService;
pub use types::{
    BulkRestoreOutcome, CleanupReport, InterceptOutcome, InterceptRequest, ItemFailure,
    ItemListing, ListRequest, ListedItem, PurgeOutcome, RestoreOutcome, RestoreRequest,
    SummaryView,
};
