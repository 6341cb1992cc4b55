//! In-memory repositories for tests and the `--memory` server mode.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use projectfs_core::result::AppResult;
use projectfs_core::types::{ClientId, ProjectId, RecycleItemId, SortOrder};
use projectfs_entity::project::Project;
use projectfs_entity::recycle_bin::{
    ActiveSummary, FileType, ItemMetadata, ItemQuery, RecycleBinItem, SortKey,
};

use super::{ProjectDirectory, RecycleBinRepository};

/// Projects held in a map.
#[derive(Debug, Default)]
pub struct MemoryProjectDirectory {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

impl MemoryProjectDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a project.
    pub async fn upsert(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }

    /// Remove a project.
    pub async fn remove(&self, id: ProjectId) -> Option<Project> {
        self.projects.write().await.remove(&id)
    }
}

#[async_trait]
impl ProjectDirectory for MemoryProjectDirectory {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Project>> {
        let mut all: Vec<Project> = self.projects.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.project_number.cmp(&b.project_number));
        Ok(all)
    }
}

/// Recycle bin items held in a map.
#[derive(Debug, Default)]
pub struct MemoryRecycleBinRepository {
    items: RwLock<HashMap<RecycleItemId, RecycleBinItem>>,
}

impl MemoryRecycleBinRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored item in any state.
    pub async fn all(&self) -> Vec<RecycleBinItem> {
        self.items.read().await.values().cloned().collect()
    }
}

fn matches(item: &RecycleBinItem, query: &ItemQuery) -> bool {
    if !item.can_restore {
        return false;
    }
    if query.client_id.is_some_and(|c| c != item.client_id) {
        return false;
    }
    if query.file_type.is_some_and(|t| t != item.file_type) {
        return false;
    }
    match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => {
            let needle = needle.to_lowercase();
            item.file_name.to_lowercase().contains(&needle)
                || item.original_path.to_lowercase().contains(&needle)
        }
        None => true,
    }
}

fn compare(a: &RecycleBinItem, b: &RecycleBinItem, key: SortKey) -> Ordering {
    match key {
        SortKey::DeletedAt => a.deleted_at.cmp(&b.deleted_at),
        SortKey::FileName => a.file_name.to_lowercase().cmp(&b.file_name.to_lowercase()),
        SortKey::FileSize => a.file_size.cmp(&b.file_size),
        SortKey::ExpiresAt => a.expires_at.cmp(&b.expires_at),
    }
}

#[async_trait]
impl RecycleBinRepository for MemoryRecycleBinRepository {
    async fn insert(&self, item: &RecycleBinItem) -> AppResult<()> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RecycleItemId) -> AppResult<Option<RecycleBinItem>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn transition(&self, item: &RecycleBinItem) -> AppResult<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&item.id) {
            Some(stored) if stored.can_restore => {
                *stored = item.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_metadata(&self, id: RecycleItemId, metadata: &ItemMetadata) -> AppResult<()> {
        if let Some(stored) = self.items.write().await.get_mut(&id) {
            stored.metadata.0 = metadata.clone();
        }
        Ok(())
    }

    async fn list_active(&self, query: &ItemQuery) -> AppResult<(Vec<RecycleBinItem>, u64)> {
        let items = self.items.read().await;
        let mut matching: Vec<RecycleBinItem> = items
            .values()
            .filter(|item| matches(item, query))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matching.len() as u64;
        let page: Vec<RecycleBinItem> = matching
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn active_summary(&self, client_id: Option<ClientId>) -> AppResult<ActiveSummary> {
        let items = self.items.read().await;
        let mut summary = ActiveSummary::default();
        for item in items
            .values()
            .filter(|i| i.can_restore && client_id.is_none_or(|c| c == i.client_id))
        {
            summary.total_files += 1;
            summary.total_size += item.size_bytes();
            match item.file_type {
                FileType::File => summary.file_count += 1,
                FileType::Folder => summary.folder_count += 1,
            }
            summary.oldest_item = Some(
                summary
                    .oldest_item
                    .map_or(item.deleted_at, |t| t.min(item.deleted_at)),
            );
            summary.newest_item = Some(
                summary
                    .newest_item
                    .map_or(item.deleted_at, |t| t.max(item.deleted_at)),
            );
        }
        Ok(summary)
    }

    async fn total_active_size(&self) -> AppResult<u64> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.can_restore)
            .map(RecycleBinItem::size_bytes)
            .sum())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<RecycleBinItem>> {
        let mut expired: Vec<RecycleBinItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.can_restore && i.is_expired(now))
            .cloned()
            .collect();
        expired.sort_by_key(|i| i.expires_at);
        Ok(expired)
    }

    async fn list_active_oldest_first(&self) -> AppResult<Vec<RecycleBinItem>> {
        let mut active: Vec<RecycleBinItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.can_restore)
            .cloned()
            .collect();
        active.sort_by_key(|i| i.deleted_at);
        Ok(active)
    }
}
