//! Events emitted by the disk watcher and the recycle bin.
//!
//! Disk changes are broadcast by the watcher and relayed by the realtime
//! hub. Recycle bin events are published by the recycle bin service.
//! Deletion tasks travel on the bounded queue between the watcher and the
//! recycle bin worker.

pub mod deletion;
pub mod disk;
pub mod recycle_bin;

pub use deletion::DeletionTask;
pub use disk::{ChangeAction, DiskChange};
pub use recycle_bin::{RecycleBinEvent, RecycleBinEventKind};
