//! # projectfs-database
//!
//! PostgreSQL connection management, the repository traits the services
//! depend on, and their PostgreSQL and in-memory implementations.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    MemoryProjectDirectory, MemoryRecycleBinRepository, PgRecycleBinRepository, ProjectDirectory,
    ProjectRepository, RecycleBinRepository,
};
