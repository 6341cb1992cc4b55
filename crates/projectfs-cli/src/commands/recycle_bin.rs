//! Recycle bin administration commands.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use projectfs_core::config::AppConfig;
use projectfs_core::traits::clock::SystemClock;
use projectfs_core::types::{ClientId, PageRequest, RecycleItemId};
use projectfs_database::PgRecycleBinRepository;
use projectfs_entity::recycle_bin::format_size;
use projectfs_service::RecycleBinService;
use projectfs_service::recycle_bin::ListRequest;

/// Acting user recorded on items purged from the command line.
const CLI_USER: &str = "cli";

/// Arguments for `recycle-bin`
#[derive(Debug, Args)]
pub struct RecycleBinArgs {
    /// Recycle bin subcommand
    #[command(subcommand)]
    pub command: RecycleBinCommand,
}

/// Recycle bin subcommands
#[derive(Debug, Subcommand)]
pub enum RecycleBinCommand {
    /// List active items
    List {
        /// Restrict to one client
        #[arg(long)]
        client_id: Option<String>,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Items per page
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
    /// Run the expiry and size-cap cleanup now
    Cleanup,
    /// Permanently delete items
    Purge {
        /// Item ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Reason recorded in the audit trail
        #[arg(long, default_value = "manual_delete")]
        reason: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Item display row
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    /// Item ID
    id: String,
    /// Name
    name: String,
    /// File or folder
    kind: String,
    /// Size
    size: String,
    /// Deleted at
    deleted_at: String,
    /// Days left
    days_left: i64,
    /// Original path
    original_path: String,
}

/// Execute recycle bin commands
pub async fn execute(
    args: &RecycleBinArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pool = super::connect(config).await?;
    let repo = Arc::new(PgRecycleBinRepository::new(pool.pool().clone()));
    let service = RecycleBinService::new(
        repo,
        config.recycle_bin.clone(),
        SystemClock::shared(),
        config.realtime.channel_buffer_size,
    );

    let result = run(&args.command, &service, format).await;
    pool.close().await;
    result
}

async fn run(
    command: &RecycleBinCommand,
    service: &RecycleBinService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        RecycleBinCommand::List {
            client_id,
            page,
            limit,
        } => {
            let client = client_id
                .as_deref()
                .map(|raw| {
                    raw.parse::<ClientId>()
                        .with_context(|| format!("Invalid client id '{raw}'"))
                })
                .transpose()?;
            let request = ListRequest {
                page: PageRequest::new(*page, *limit),
                ..ListRequest::default()
            };
            let listing = service.list_items(client, request).await?;

            let rows: Vec<ItemRow> = listing
                .items
                .iter()
                .map(|listed| ItemRow {
                    id: listed.item.id.to_string(),
                    name: listed.item.file_name.clone(),
                    kind: listed.item.file_type.to_string(),
                    size: listed.formatted_size.clone(),
                    deleted_at: listed.item.deleted_at.format("%Y-%m-%d %H:%M").to_string(),
                    days_left: listed.days_until_expiry,
                    original_path: listed.item.original_path.clone(),
                })
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv("Total items", &listing.pagination.total.to_string());
                output::print_kv("Total size", &listing.summary.formatted_total_size);
            }
        }
        RecycleBinCommand::Cleanup => {
            let report = service.run_scheduled_cleanup().await?;
            output::print_item(&report, format);
            output::print_success(&format!(
                "Cleanup freed {}",
                format_size(report.total_size_freed)
            ));
        }
        RecycleBinCommand::Purge { ids, reason, yes } => {
            let ids = ids
                .iter()
                .map(|raw| {
                    raw.parse::<RecycleItemId>()
                        .with_context(|| format!("Invalid item id '{raw}'"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Permanently delete {} item(s)? This cannot be undone.",
                        ids.len()
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirm {
                    output::print_warning("Purge cancelled.");
                    return Ok(());
                }
            }

            let outcome = service.permanently_delete(&ids, CLI_USER, reason).await;
            for failure in &outcome.failures {
                output::print_warning(&format!("{}: {}", failure.id, failure.message));
            }
            output::print_success(&format!(
                "Deleted {} item(s), freed {}",
                outcome.deleted_count,
                format_size(outcome.total_size_freed)
            ));
        }
    }
    Ok(())
}
