//! # projectfs-service
//!
//! Use cases over the project disk: folder tree synchronization and folder
//! operations, the recycle bin lifecycle, and project folder relocation.
//!
//! Services take their collaborators at construction time as `Arc`s or
//! cheap clones.

pub mod context;
pub mod folder;
pub mod recycle_bin;
pub mod relocation;

pub use context::RequestContext;
pub use folder::FolderService;
pub use recycle_bin::RecycleBinService;
pub use relocation::Relocator;
