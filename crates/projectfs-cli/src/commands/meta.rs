//! Folder descriptor maintenance commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use projectfs_core::config::AppConfig;
use projectfs_storage::{DiskRoot, Scaffolder, tree};

/// Arguments for `meta`
#[derive(Debug, Args)]
pub struct MetaArgs {
    /// Meta subcommand
    #[command(subcommand)]
    pub command: MetaCommand,
}

/// Meta subcommands
#[derive(Debug, Subcommand)]
pub enum MetaCommand {
    /// Rewrite `allowedRoles` and `structure` in every descriptor to the
    /// configured folder policy
    Migrate,
}

/// One descriptor visited by `meta migrate`
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Project folder
    folder: String,
    /// Outcome
    status: String,
}

/// Execute meta commands
pub async fn execute(args: &MetaArgs, config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    match &args.command {
        MetaCommand::Migrate => migrate(config, format).await,
    }
}

async fn migrate(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let scaffolder = Scaffolder::new(DiskRoot::probe(&config.storage), config.folders.clone());
    let folders = tree::list_meta_folders(scaffolder.disk_root().root()).await?;
    tracing::debug!(
        root = %scaffolder.disk_root().root().display(),
        count = folders.len(),
        "Migrating folder descriptors"
    );

    let mut rows = Vec::with_capacity(folders.len());
    let mut updated = 0usize;
    let mut failed = 0usize;
    for folder in folders {
        let status = match scaffolder.migrate_policy(&folder).await {
            Ok(true) => {
                updated += 1;
                "updated".to_string()
            }
            Ok(false) => "unchanged".to_string(),
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "Descriptor migration failed");
                failed += 1;
                format!("failed: {}", e.message)
            }
        };
        rows.push(MigrationRow {
            folder: folder.display().to_string(),
            status,
        });
    }

    output::print_list(&rows, format);
    if failed > 0 {
        output::print_warning(&format!("{failed} descriptor(s) could not be migrated"));
    }
    output::print_success(&format!("{updated} of {} descriptor(s) updated", rows.len()));
    Ok(())
}
