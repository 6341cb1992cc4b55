//! Project folder scaffolding.

use anyhow::bail;
use clap::Args;

use super::ProjectSelector;
use crate::output;
use projectfs_core::config::AppConfig;
use projectfs_storage::{DiskRoot, Scaffolder};

/// Arguments for `scaffold`
#[derive(Debug, Args)]
pub struct ScaffoldArgs {
    #[command(flatten)]
    pub project: ProjectSelector,
}

/// Execute `scaffold`
pub async fn execute(args: &ScaffoldArgs, config: &AppConfig) -> anyhow::Result<()> {
    let project = args.project.project(config).await?;
    let scaffolder = Scaffolder::new(DiskRoot::probe(&config.storage), config.folders.clone());
    let region = args.project.region.as_deref();

    if !scaffolder.create_initial_folders(&project, region).await? {
        bail!(
            "Project {} has identifiers that cannot produce a folder",
            project.folder_name()
        );
    }

    let path = scaffolder
        .disk_root()
        .project_root(&project, region)
        .into_result()?;
    output::print_success(&format!("Scaffolded {}", path.display()));
    Ok(())
}
