//! Recycle bin listing, restore, permanent delete, and cleanup.

use std::path::{Component, Path as FsPath};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use projectfs_core::error::AppError;
use projectfs_core::types::ClientId;
use projectfs_service::recycle_bin::RestoreRequest;

use crate::dto::request::{
    BulkRestoreRequest, PermanentDeleteRequest, RestoreItemRequest, validated,
};
use crate::error::ApiResult;
use crate::extractors::path;
use crate::extractors::{ActingUser, ListParams};
use crate::state::AppState;

/// Default reason for purges requested through the API.
const MANUAL_PURGE: &str = "manual_delete";

/// Optional client scope for the summary.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// Restrict to one client.
    pub client_id: Option<ClientId>,
}

/// GET /recycle-bin/items
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let listing = state
        .recycle_bin
        .list_items(None, params.into_request())
        .await?;
    Ok(Json(json!({ "success": true, "data": listing })))
}

/// GET /recycle-bin/client/{clientId}
pub async fn list_client_items(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let client_id = path::client_id(&client_id)?;
    let listing = state
        .recycle_bin
        .list_items(Some(client_id), params.into_request())
        .await?;
    Ok(Json(json!({ "success": true, "data": listing })))
}

/// GET /recycle-bin/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let item = state.recycle_bin.get_item(path::item_id(&id)?).await?;
    Ok(Json(json!({ "success": true, "data": item })))
}

/// GET /recycle-bin/summary
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<Value>> {
    let summary = state.recycle_bin.summary(query.client_id).await?;
    Ok(Json(json!({ "success": true, "data": summary })))
}

/// POST /recycle-bin/restore/{id}
///
/// The body is optional; `restorePath` must stay inside the project disk.
pub async fn restore(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let id = path::item_id(&id)?;
    let req: RestoreItemRequest = optional_body(&body)?;
    if let Some(target) = req.restore_path.as_deref() {
        ensure_within(state.folders.disk_root().root(), FsPath::new(target))?;
    }

    let outcome = state
        .recycle_bin
        .restore(
            id,
            RestoreRequest {
                user_id: user.id().to_string(),
                restore_path: req.restore_path,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": outcome })))
}

/// POST /recycle-bin/restore-bulk
pub async fn restore_bulk(
    State(state): State<AppState>,
    user: ActingUser,
    Json(req): Json<BulkRestoreRequest>,
) -> ApiResult<Json<Value>> {
    let req = validated(req)?;
    let outcome = state.recycle_bin.restore_bulk(&req.ids, user.id()).await;
    Ok(Json(json!({ "success": true, "data": outcome })))
}

/// DELETE /recycle-bin/permanent/{id}
pub async fn permanent_delete(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let id = path::item_id(&id)?;
    let req: PermanentDeleteRequest = optional_body(&body)?;
    let reason = purge_reason(req.reason);
    let freed = state
        .recycle_bin
        .purge_item(id, user.id(), &reason, None)
        .await?;
    Ok(Json(json!({
        "success": true,
        "data": { "deletedCount": 1, "totalSizeFreed": freed }
    })))
}

/// DELETE /recycle-bin/permanent-bulk
pub async fn permanent_delete_bulk(
    State(state): State<AppState>,
    user: ActingUser,
    Json(req): Json<PermanentDeleteRequest>,
) -> ApiResult<Json<Value>> {
    if req.ids.is_empty() {
        return Err(AppError::validation("No items selected").into());
    }
    let reason = purge_reason(req.reason);
    let outcome = state
        .recycle_bin
        .permanently_delete(&req.ids, user.id(), &reason)
        .await;
    Ok(Json(json!({ "success": true, "data": outcome })))
}

/// POST /recycle-bin/cleanup
pub async fn run_cleanup(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let report = state.recycle_bin.run_scheduled_cleanup().await?;
    Ok(Json(json!({ "success": true, "data": report })))
}

fn purge_reason(reason: Option<String>) -> String {
    reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| MANUAL_PURGE.to_string())
}

fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))
}

/// Reject restore targets that are relative, climb with `..`, or leave
/// the project disk.
fn ensure_within(root: &FsPath, target: &FsPath) -> Result<(), AppError> {
    let climbs = target
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if !target.is_absolute() || climbs || !target.starts_with(root) {
        return Err(AppError::validation(format!(
            "Restore path {} must be inside {}",
            target.display(),
            root.display()
        )));
    }
    Ok(())
}
