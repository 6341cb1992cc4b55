//! Folder create, rename and delete on the project disk.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use projectfs_core::error::AppError;
use projectfs_service::recycle_bin::InterceptRequest;

use crate::dto::request::{
    CreateFolderRequest, DeleteQuery, RegionQuery, RenameFolderRequest, validated,
};
use crate::error::ApiResult;
use crate::extractors::ActingUser;
use crate::extractors::path;
use crate::state::AppState;

/// Deletion method recorded for deletes made through the API.
const UI_METHOD: &str = "ui";
/// Default deletion reason for deletes made through the API.
const USER_ACTION: &str = "user_action";

/// POST /files/{projectId}/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(region): Query<RegionQuery>,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let req = validated(req)?;
    state
        .folders
        .create_folder(project_id, region.as_deref(), &req.parent_path, &req.folder_name)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "name": req.folder_name,
            "relativePath": join_relative(&req.parent_path, &req.folder_name),
        }
    })))
}

/// PUT /files/{projectId}/folders/{*folderId}
///
/// The folder id is its path relative to the project root.
pub async fn rename_folder(
    State(state): State<AppState>,
    Path((project_id, folder_id)): Path<(String, String)>,
    Query(region): Query<RegionQuery>,
    Json(req): Json<RenameFolderRequest>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let req = validated(req)?;
    state
        .folders
        .rename_entry(project_id, region.as_deref(), &folder_id, &req.new_name)
        .await?;

    let parent = folder_id
        .trim_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("");
    Ok(Json(json!({
        "success": true,
        "data": {
            "name": req.new_name,
            "relativePath": join_relative(parent, &req.new_name),
        }
    })))
}

/// DELETE /files/{projectId}/folders/{*path}
///
/// Moves the entry into the recycle bin. Projects without a client cannot
/// be partitioned in the bin, so the delete is refused.
pub async fn delete_entry(
    State(state): State<AppState>,
    user: ActingUser,
    Path((project_id, relative)): Path<(String, String)>,
    Query(region): Query<RegionQuery>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let project = state.folders.find_project(project_id).await?;
    let client_id = project.client_id.ok_or_else(|| {
        AppError::validation(format!(
            "Project {project_id} has no client; deletions cannot be recycled"
        ))
    })?;

    let target = state
        .folders
        .resolve_existing(&project, region.as_deref(), &relative)
        .await?;

    state.watcher().claim_removal(&target);
    let outcome = state
        .recycle_bin
        .intercept(
            &target,
            InterceptRequest {
                client_id,
                project_id: Some(project_id),
                user_id: user.id().to_string(),
                deleted_by: user.id().to_string(),
                deletion_reason: query
                    .reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| USER_ACTION.to_string()),
                deletion_method: UI_METHOD.to_string(),
            },
        )
        .await
        .inspect_err(|_| state.watcher().release_claim(&target))?;

    Ok(Json(json!({ "success": true, "data": outcome })))
}

fn join_relative(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("", "Admin"), "Admin");
        assert_eq!(join_relative("/Project/", "Drawings"), "Project/Drawings");
    }
}
