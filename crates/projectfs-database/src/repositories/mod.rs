//! Repository traits and their implementations.
//!
//! Services hold `Arc<dyn ProjectDirectory>` and
//! `Arc<dyn RecycleBinRepository>` so the same code runs against
//! PostgreSQL in production and the in-memory stores in tests.

pub mod memory;
pub mod project;
pub mod recycle_bin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use projectfs_core::result::AppResult;
use projectfs_core::types::{ClientId, ProjectId, RecycleItemId};
use projectfs_entity::project::Project;
use projectfs_entity::recycle_bin::{ActiveSummary, ItemMetadata, ItemQuery, RecycleBinItem};

pub use memory::{MemoryProjectDirectory, MemoryRecycleBinRepository};
pub use project::ProjectRepository;
pub use recycle_bin::PgRecycleBinRepository;

/// Read-only project lookup.
#[async_trait]
pub trait ProjectDirectory: Send + Sync + 'static {
    /// Find a project by its identifier.
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>>;

    /// All projects, used by batch tooling.
    async fn list_all(&self) -> AppResult<Vec<Project>>;
}

/// Persistence for recycle bin items.
///
/// Writes are single-row. [`RecycleBinRepository::transition`] only succeeds
/// while the stored row is still active, so two racing restores or purges
/// resolve to one winner.
#[async_trait]
pub trait RecycleBinRepository: Send + Sync + 'static {
    /// Persist a new active item.
    async fn insert(&self, item: &RecycleBinItem) -> AppResult<()>;

    /// Find an item in any state.
    async fn find_by_id(&self, id: RecycleItemId) -> AppResult<Option<RecycleBinItem>>;

    /// Write the terminal-state fields of `item` if the stored row is still
    /// active. Returns `false` when another writer got there first.
    async fn transition(&self, item: &RecycleBinItem) -> AppResult<bool>;

    /// Replace an item's metadata document.
    async fn update_metadata(&self, id: RecycleItemId, metadata: &ItemMetadata) -> AppResult<()>;

    /// One page of active items plus the total matching count.
    async fn list_active(&self, query: &ItemQuery) -> AppResult<(Vec<RecycleBinItem>, u64)>;

    /// Aggregates over active items, optionally for a single client.
    async fn active_summary(&self, client_id: Option<ClientId>) -> AppResult<ActiveSummary>;

    /// Total bytes held by active items.
    async fn total_active_size(&self) -> AppResult<u64>;

    /// Active items whose `expires_at` is at or before `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<RecycleBinItem>>;

    /// All active items, oldest `deleted_at` first.
    async fn list_active_oldest_first(&self) -> AppResult<Vec<RecycleBinItem>>;
}
