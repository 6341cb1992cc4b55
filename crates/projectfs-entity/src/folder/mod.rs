//! On-disk folder value objects: the `.meta.json` descriptor and the
//! folder tree returned to the UI.

pub mod meta;
pub mod tree;

pub use meta::{FolderMeta, META_FILE_NAME, META_TMP_FILE_NAME, is_descriptor_name};
pub use tree::{FILES_KEY, FolderNode};
