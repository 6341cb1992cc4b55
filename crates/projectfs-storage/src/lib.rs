//! # projectfs-storage
//!
//! Everything that touches the project disk tree directly: deterministic
//! path resolution, the `.meta.json` sidecar, folder scaffolding, tree
//! walking, move/copy with cross-device fallback, and recycle bin
//! thumbnails.

pub mod layout;
pub mod meta;
pub mod scaffold;
pub mod thumbnail;
pub mod transfer;
pub mod tree;

pub use layout::{DiskRoot, PathResolution, ProjectLocation};
pub use scaffold::Scaffolder;
pub use thumbnail::ThumbnailGenerator;
