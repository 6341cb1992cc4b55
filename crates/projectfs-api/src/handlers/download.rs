//! Single-file and zip downloads.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use projectfs_core::error::AppError;
use projectfs_service::folder::build_zip;

use crate::dto::request::{DownloadZipRequest, RegionQuery, validated};
use crate::error::ApiResult;
use crate::extractors::path;
use crate::state::AppState;

/// POST /files/{projectId}/download-zip
pub async fn download_zip(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(region): Query<RegionQuery>,
    Json(req): Json<DownloadZipRequest>,
) -> ApiResult<Response> {
    let project_id = path::project_id(&project_id)?;
    let req = validated(req)?;
    let project = state.folders.find_project(project_id).await?;
    let root = state
        .folders
        .locate_project_root(&project, region.as_deref())
        .await?;

    let mut entries = Vec::with_capacity(req.paths.len());
    for relative in &req.paths {
        entries.push(
            state
                .folders
                .resolve_existing(&project, region.as_deref(), relative)
                .await?,
        );
    }

    let bytes = build_zip(&root, entries).await?;
    let file_name = req
        .file_name
        .unwrap_or_else(|| format!("{}.zip", project.folder_name()));
    tracing::info!(%project_id, entries = req.paths.len(), size = bytes.len(), "Zip download");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, attachment(&file_name)?),
        ],
        bytes,
    )
        .into_response())
}

/// GET /files/{projectId}/download/{*path}
pub async fn download_file(
    State(state): State<AppState>,
    Path((project_id, relative)): Path<(String, String)>,
    Query(region): Query<RegionQuery>,
) -> ApiResult<Response> {
    let project_id = path::project_id(&project_id)?;
    let project = state.folders.find_project(project_id).await?;
    let target = state
        .folders
        .resolve_existing(&project, region.as_deref(), &relative)
        .await?;

    let file = tokio::fs::File::open(&target)
        .await
        .map_err(|e| AppError::io(format!("open {}", target.display()), e))?;
    let stat = file
        .metadata()
        .await
        .map_err(|e| AppError::io(format!("stat {}", target.display()), e))?;
    if !stat.is_file() {
        return Err(AppError::validation(format!("'{relative}' is not a file")).into());
    }

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    let content_length = HeaderValue::from(stat.len());

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_LENGTH, content_length),
            (header::CONTENT_DISPOSITION, attachment(&file_name)?),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn attachment(file_name: &str) -> Result<HeaderValue, AppError> {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() || !c.is_ascii() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .map_err(|_| AppError::validation(format!("Unusable file name '{file_name}'")))
}
