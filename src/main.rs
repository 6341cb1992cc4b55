//! projectfs server: project disk, recycle bin and real-time notifications.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use projectfs_core::config::AppConfig;
use projectfs_core::error::AppError;
use projectfs_core::types::ProjectId;
use projectfs_database::{
    DatabasePool, MemoryProjectDirectory, MemoryRecycleBinRepository, PgRecycleBinRepository,
    ProjectDirectory, ProjectRepository, RecycleBinRepository,
};
use projectfs_entity::project::Project;
use projectfs_storage::{DiskRoot, meta, tree};

/// Server command-line flags.
#[derive(Debug, Parser)]
#[command(name = "projectfs-server", version, about)]
struct ServerArgs {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(long, env = "PROJECTFS_ENV", default_value = "development")]
    env: String,

    /// Keep projects and recycle bin records in memory instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    let config = match AppConfig::load(&args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, args.memory).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig, memory: bool) -> Result<(), AppError> {
    tracing::info!("Starting projectfs v{}", env!("CARGO_PKG_VERSION"));

    if memory || !config.database.is_configured() {
        tracing::warn!("No database in use, records live in memory until shutdown");
        let projects = seed_from_disk(&config).await?;
        let items: Arc<dyn RecycleBinRepository> = Arc::new(MemoryRecycleBinRepository::new());
        return projectfs_api::run_server(config, projects, items).await;
    }

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        projectfs_database::migration::run_migrations(pool.pool()).await?;
        tracing::info!("Database migrations complete");
    }

    let projects: Arc<dyn ProjectDirectory> = Arc::new(ProjectRepository::new(pool.pool().clone()));
    let items: Arc<dyn RecycleBinRepository> =
        Arc::new(PgRecycleBinRepository::new(pool.pool().clone()));

    let result = projectfs_api::run_server(config, projects, items).await;
    pool.close().await;
    result
}

/// Build an in-memory project directory from the descriptors already on
/// disk, so existing project folders stay reachable without a database.
async fn seed_from_disk(config: &AppConfig) -> Result<Arc<dyn ProjectDirectory>, AppError> {
    let root = DiskRoot::probe(&config.storage);
    let directory = MemoryProjectDirectory::new();

    let mut seeded = 0usize;
    for folder in tree::list_meta_folders(root.root()).await? {
        let Some(descriptor) = meta::read_meta(&folder).await else {
            continue;
        };
        let Ok(id) = descriptor.project_id.parse::<ProjectId>() else {
            tracing::warn!(folder = %folder.display(), "Descriptor has a malformed project id");
            continue;
        };
        let Some(location) = root.locate(&folder) else {
            continue;
        };
        let Some((number, name)) = location.folder_name.split_once(" - ") else {
            continue;
        };

        let mut project = Project::new(number, name).with_region(location.region);
        project.id = id;
        directory.upsert(project).await;
        seeded += 1;
    }

    tracing::info!(root = %root, projects = seeded, "Seeded project directory from disk");
    Ok(Arc::new(directory))
}
