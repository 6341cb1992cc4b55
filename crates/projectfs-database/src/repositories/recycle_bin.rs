//! PostgreSQL recycle bin store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::result::AppResult;
use projectfs_core::types::{ClientId, RecycleItemId};
use projectfs_entity::recycle_bin::{
    ActiveSummary, ItemMetadata, ItemQuery, RecycleBinItem,
};

use super::RecycleBinRepository;

/// Stores items in `recycle_bin_items`.
#[derive(Debug, Clone)]
pub struct PgRecycleBinRepository {
    pool: PgPool,
}

impl PgRecycleBinRepository {
    /// Create a new recycle bin repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a ItemQuery) {
        builder.push(" WHERE can_restore = TRUE");
        if let Some(client_id) = query.client_id {
            builder.push(" AND client_id = ").push_bind(client_id);
        }
        if let Some(file_type) = query.file_type {
            builder.push(" AND file_type = ").push_bind(file_type);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            builder
                .push(" AND (file_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR original_path ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    total_files: i64,
    total_size: i64,
    file_count: i64,
    folder_count: i64,
    oldest_item: Option<DateTime<Utc>>,
    newest_item: Option<DateTime<Utc>>,
}

#[async_trait]
impl RecycleBinRepository for PgRecycleBinRepository {
    async fn insert(&self, item: &RecycleBinItem) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO recycle_bin_items (id, original_path, file_name, file_type, file_size, \
             client_id, project_id, deleted_at, deleted_by, deletion_reason, deletion_method, \
             recycle_bin_path, can_restore, expires_at, metadata, audit_log) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(item.id)
        .bind(&item.original_path)
        .bind(&item.file_name)
        .bind(item.file_type)
        .bind(item.file_size)
        .bind(item.client_id)
        .bind(item.project_id)
        .bind(item.deleted_at)
        .bind(&item.deleted_by)
        .bind(&item.deletion_reason)
        .bind(&item.deletion_method)
        .bind(&item.recycle_bin_path)
        .bind(item.can_restore)
        .bind(item.expires_at)
        .bind(&item.metadata)
        .bind(&item.audit_log)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert recycle bin item", e)
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: RecycleItemId) -> AppResult<Option<RecycleBinItem>> {
        sqlx::query_as::<_, RecycleBinItem>("SELECT * FROM recycle_bin_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find recycle bin item", e)
            })
    }

    async fn transition(&self, item: &RecycleBinItem) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE recycle_bin_items SET can_restore = $2, restored_at = $3, restored_by = $4, \
             permanently_deleted_at = $5, cleanup_reason = $6, metadata = $7, audit_log = $8 \
             WHERE id = $1 AND can_restore = TRUE",
        )
        .bind(item.id)
        .bind(item.can_restore)
        .bind(item.restored_at)
        .bind(&item.restored_by)
        .bind(item.permanently_deleted_at)
        .bind(item.cleanup_reason)
        .bind(&item.metadata)
        .bind(&item.audit_log)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update recycle bin item", e)
        })?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_metadata(&self, id: RecycleItemId, metadata: &ItemMetadata) -> AppResult<()> {
        sqlx::query("UPDATE recycle_bin_items SET metadata = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(metadata))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update item metadata", e)
            })?;
        Ok(())
    }

    async fn list_active(&self, query: &ItemQuery) -> AppResult<(Vec<RecycleBinItem>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recycle_bin_items");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count recycle bin items", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM recycle_bin_items");
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort_by.column())
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(" LIMIT ")
            .push_bind(query.page.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let items = select
            .build_query_as::<RecycleBinItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list recycle bin items", e)
            })?;

        Ok((items, total.max(0) as u64))
    }

    async fn active_summary(&self, client_id: Option<ClientId>) -> AppResult<ActiveSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            "SELECT COUNT(*) AS total_files, \
             COALESCE(SUM(file_size), 0)::BIGINT AS total_size, \
             COUNT(*) FILTER (WHERE file_type = 'file') AS file_count, \
             COUNT(*) FILTER (WHERE file_type = 'folder') AS folder_count, \
             MIN(deleted_at) AS oldest_item, MAX(deleted_at) AS newest_item \
             FROM recycle_bin_items \
             WHERE can_restore = TRUE AND ($1::UUID IS NULL OR client_id = $1)",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to summarize recycle bin", e)
        })?;

        Ok(ActiveSummary {
            total_files: row.total_files.max(0) as u64,
            total_size: row.total_size.max(0) as u64,
            file_count: row.file_count.max(0) as u64,
            folder_count: row.folder_count.max(0) as u64,
            oldest_item: row.oldest_item,
            newest_item: row.newest_item,
        })
    }

    async fn total_active_size(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(file_size), 0)::BIGINT FROM recycle_bin_items \
             WHERE can_restore = TRUE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to total recycle bin size", e)
        })?;
        Ok(total.max(0) as u64)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<RecycleBinItem>> {
        sqlx::query_as::<_, RecycleBinItem>(
            "SELECT * FROM recycle_bin_items WHERE can_restore = TRUE AND expires_at <= $1 \
             ORDER BY expires_at ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find expired items", e))
    }

    async fn list_active_oldest_first(&self) -> AppResult<Vec<RecycleBinItem>> {
        sqlx::query_as::<_, RecycleBinItem>(
            "SELECT * FROM recycle_bin_items WHERE can_restore = TRUE ORDER BY deleted_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active items", e))
    }
}
