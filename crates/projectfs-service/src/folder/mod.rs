//! Project folder lookup, tree synchronization, and folder operations.

pub mod archive;
pub mod service;

pub use archive::build_zip;
pub use service::FolderService;
