//! Application builder: wires router, middleware, state, and background
//! tasks into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use projectfs_core::config::AppConfig;
use projectfs_core::error::AppError;
use projectfs_core::traits::SystemClock;
use projectfs_database::{ProjectDirectory, RecycleBinRepository};
use projectfs_worker::jobs::{RecycleBinCleanupJob, WatcherSweepJob};
use projectfs_worker::{CronScheduler, DeletionWorker, JobExecutor, deletion_queue};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the projectfs server until Ctrl+C.
pub async fn run_server(
    config: AppConfig,
    projects: Arc<dyn ProjectDirectory>,
    recycle_items: Arc<dyn RecycleBinRepository>,
) -> Result<(), AppError> {
    tracing::info!("Starting projectfs server...");

    // ── Step 1: Recycle bin directory ────────────────────────────
    tokio::fs::create_dir_all(&config.recycle_bin.path)
        .await
        .map_err(|e| AppError::io(format!("create {}", config.recycle_bin.path), e))?;

    // ── Step 2: Services ─────────────────────────────────────────
    let (deletion_tx, deletion_rx) = deletion_queue(config.watcher.deletion_queue_capacity);
    let state = AppState::assemble(
        config.clone(),
        projects,
        recycle_items,
        SystemClock::shared(),
        Some(deletion_tx),
    );
    tracing::info!(
        disk_root = %state.folders.disk_root().root().display(),
        recycle_bin = %state.recycle_bin.bin_root().display(),
        watchers = config.watcher.enabled,
        "Services initialized"
    );

    // ── Step 3: Background tasks ─────────────────────────────────
    let forwarders = state
        .realtime
        .start_forwarding(state.recycle_bin.subscribe());
    let deletion_worker = DeletionWorker::new(state.recycle_bin.clone()).spawn(deletion_rx);

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(RecycleBinCleanupJob::new(state.recycle_bin.clone())));
    executor.register(Arc::new(WatcherSweepJob::new(state.watcher().clone())));
    let mut scheduler = CronScheduler::new(Arc::new(executor)).await?;
    scheduler
        .register_default_tasks(&config.recycle_bin, &config.watcher)
        .await?;
    scheduler.start().await?;

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("projectfs server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Shutdown ─────────────────────────────────────────
    tracing::info!("Shutting down background tasks");
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }
    drop(scheduler);
    state.realtime.shutdown();
    for task in forwarders {
        task.abort();
    }

    // The worker exits once the last watcher handle (and its queue
    // sender) is gone.
    drop(state);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, deletion_worker).await.is_err() {
        tracing::warn!("Deletion worker did not finish within the grace period");
    }

    tracing::info!("projectfs server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
