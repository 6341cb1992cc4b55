//! Project records owned by the CRUD subsystem.

pub mod model;

pub use model::Project;
