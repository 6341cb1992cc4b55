//! Route definitions for the projectfs HTTP API.
//!
//! Routes are grouped by resource. Everything except the long-poll,
//! download and WebSocket routes runs under the request timeout.

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds.max(1));

    let timed = Router::new()
        .merge(project_routes())
        .merge(folder_routes())
        .merge(recycle_bin_routes())
        .merge(health_routes())
        .layer(TimeoutLayer::new(timeout));

    let untimed = Router::new()
        .merge(streaming_routes())
        .route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .merge(timed)
        .merge(untimed)
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Descriptor, tree, watch, and relocation endpoints
fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/files/{project_id}/meta", get(handlers::project::get_meta))
        .route(
            "/files/{project_id}/folder-tree",
            get(handlers::project::get_folder_tree),
        )
        .route(
            "/files/{project_id}/watch-folder-tree",
            get(handlers::project::watch_folder_tree),
        )
        .route(
            "/files/{project_id}/notify-folder-update",
            post(handlers::project::notify_folder_update),
        )
        .route("/files/{project_id}/unwatch", post(handlers::project::unwatch))
        .route("/files/{project_id}/relocate", post(handlers::project::relocate))
}

/// Folder create, rename, delete
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/{project_id}/folders",
            post(handlers::folder::create_folder),
        )
        .route(
            "/files/{project_id}/folders/{*path}",
            delete(handlers::folder::delete_entry).put(handlers::folder::rename_folder),
        )
}

/// Long-poll and downloads
fn streaming_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/{project_id}/watch-disk",
            get(handlers::project::watch_disk),
        )
        .route(
            "/files/{project_id}/download-zip",
            post(handlers::download::download_zip),
        )
        .route(
            "/files/{project_id}/download/{*path}",
            get(handlers::download::download_file),
        )
}

/// Recycle bin listing, restore, purge, cleanup
fn recycle_bin_routes() -> Router<AppState> {
    Router::new()
        .route("/recycle-bin/items", get(handlers::recycle_bin::list_items))
        .route("/recycle-bin/items/{id}", get(handlers::recycle_bin::get_item))
        .route("/recycle-bin/summary", get(handlers::recycle_bin::summary))
        .route(
            "/recycle-bin/client/{client_id}",
            get(handlers::recycle_bin::list_client_items),
        )
        .route(
            "/recycle-bin/restore/{id}",
            post(handlers::recycle_bin::restore),
        )
        .route(
            "/recycle-bin/restore-bulk",
            post(handlers::recycle_bin::restore_bulk),
        )
        .route(
            "/recycle-bin/permanent/{id}",
            delete(handlers::recycle_bin::permanent_delete),
        )
        .route(
            "/recycle-bin/permanent-bulk",
            delete(handlers::recycle_bin::permanent_delete_bulk),
        )
        .route("/recycle-bin/cleanup", post(handlers::recycle_bin::run_cleanup))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
