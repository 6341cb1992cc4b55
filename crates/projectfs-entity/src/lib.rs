//! # projectfs-entity
//!
//! Domain entity models for projectfs. Database rows derive
//! `sqlx::FromRow`; value objects such as the `.meta.json` descriptor and
//! the folder tree only carry serde impls.

pub mod folder;
pub mod project;
pub mod recycle_bin;
