//! Project path resolution.

use clap::Args;
use serde::Serialize;

use super::ProjectSelector;
use crate::output::{self, OutputFormat};
use projectfs_core::config::AppConfig;
use projectfs_storage::{DiskRoot, PathResolution};

/// Arguments for `resolve-path`
#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectSelector,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolved {
    project_id: String,
    region: String,
    path: String,
    exists: bool,
}

/// Execute `resolve-path`
pub async fn execute(
    args: &ResolveArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let project = args.project.project(config).await?;
    let root = DiskRoot::probe(&config.storage);
    let region = root.region_for(&project, args.project.region.as_deref());

    match root.project_root(&project, args.project.region.as_deref()) {
        PathResolution::Resolved(path) => {
            let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
            output::print_item(
                &Resolved {
                    project_id: project.id.to_string(),
                    region,
                    path: path.display().to_string(),
                    exists,
                },
                format,
            );
        }
        PathResolution::Invalid(reason) => {
            anyhow::bail!("Cannot resolve a folder for {}: {reason}", project.folder_name());
        }
    }
    Ok(())
}
