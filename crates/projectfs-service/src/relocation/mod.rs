//! Project folder relocation after a rename or renumbering.

pub mod service;

pub use service::{RelocationAction, RelocationOutcome, Relocator};
