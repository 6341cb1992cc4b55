//! Project folder views: descriptor, tree, watching, and relocation.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_entity::project::Project;
use projectfs_service::relocation::RelocationAction;

use crate::dto::request::{RegionQuery, RelocateRequest, WatchDiskQuery, validated};
use crate::error::ApiResult;
use crate::extractors::ActingUser;
use crate::extractors::path;
use crate::state::AppState;

/// GET /files/{projectId}/meta
pub async fn get_meta(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(region): Query<RegionQuery>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let meta = state
        .folders
        .read_root_meta(project_id, region.as_deref())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Project {project_id} has no descriptor")))?;
    Ok(Json(json!({ "success": true, "data": meta })))
}

/// GET /files/{projectId}/folder-tree
pub async fn get_folder_tree(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(region): Query<RegionQuery>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let tree = state
        .folders
        .build_folder_tree(project_id, region.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "data": tree })))
}

/// GET /files/{projectId}/watch-folder-tree
///
/// Starts (or keeps alive) the project's watcher, then returns the tree.
pub async fn watch_folder_tree(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(region): Query<RegionQuery>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let tree = state
        .folders
        .build_folder_tree(project_id, region.as_deref())
        .await?;

    let watching = match state.watcher().start_watch(project_id).await {
        Ok(watching) => watching,
        Err(e) if e.is(ErrorKind::Validation) => {
            tracing::warn!(%project_id, reason = %e.message, "Project folder cannot be watched");
            false
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(json!({
        "success": true,
        "data": { "tree": tree, "watching": watching }
    })))
}

/// GET /files/{projectId}/watch-disk
///
/// Long-poll: answers with the next change or `changed: false` once the
/// timeout passes.
pub async fn watch_disk(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<WatchDiskQuery>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let cap = state.config.watcher.long_poll_timeout_seconds;
    let wait = Duration::from_secs(query.timeout.map_or(cap, |t| t.min(cap)));

    let data = match state.watcher().wait_for_change(project_id, wait).await? {
        Some(change) => json!({ "changed": true, "change": change }),
        None => json!({ "changed": false }),
    };
    Ok(Json(json!({ "success": true, "data": data })))
}

/// POST /files/{projectId}/notify-folder-update
pub async fn notify_folder_update(
    State(state): State<AppState>,
    user: ActingUser,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    state.folders.find_project(project_id).await?;

    let watching = state.watcher().touch(project_id);
    let delivered = state
        .realtime
        .bridge
        .on_folder_tree_updated(project_id, user.id());

    Ok(Json(json!({
        "success": true,
        "data": { "delivered": delivered, "watching": watching }
    })))
}

/// POST /files/{projectId}/unwatch
///
/// Acknowledged only; idle watches are evicted by the sweep.
pub async fn unwatch(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    Ok(Json(json!({
        "success": true,
        "data": { "acknowledged": true, "watching": state.watcher().is_watching(project_id) }
    })))
}

/// POST /files/{projectId}/relocate
///
/// Called after a project's number, name or region changed. The project
/// record already holds the new values; the body carries the old ones.
pub async fn relocate(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(req): Json<RelocateRequest>,
) -> ApiResult<Json<Value>> {
    let project_id = path::project_id(&project_id)?;
    let req = validated(req)?;
    let current = state.folders.find_project(project_id).await?;

    let previous = Project {
        project_number: req.previous_project_number,
        name: req.previous_name,
        region: req.previous_region.or_else(|| current.region.clone()),
        ..current.clone()
    };

    let outcome = state
        .relocator
        .relocate_or_repair(&previous, &current, None)
        .await;

    match outcome.action {
        RelocationAction::Conflict => Err(AppError::conflict(
            outcome
                .reason
                .unwrap_or_else(|| "Destination folder already exists".to_string()),
        )
        .into()),
        _ => Ok(Json(json!({ "success": outcome.success, "data": outcome }))),
    }
}
