//! Core traits defined in `projectfs-core` and implemented by other crates.

pub mod clock;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
