//! PostgreSQL project lookup.

use async_trait::async_trait;
use sqlx::PgPool;

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::result::AppResult;
use projectfs_core::types::ProjectId;
use projectfs_entity::project::Project;

use super::ProjectDirectory;

/// Reads projects from the `projects` table.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectDirectory for ProjectRepository {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, client_id, project_number, name, region FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, client_id, project_number, name, region FROM projects \
             ORDER BY project_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))
    }
}
