//! CLI command definitions and dispatch.

pub mod meta;
pub mod recycle_bin;
pub mod resolve;
pub mod scaffold;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use projectfs_core::config::AppConfig;
use projectfs_core::types::{ClientId, ProjectId};
use projectfs_database::{DatabasePool, ProjectDirectory, ProjectRepository};
use projectfs_entity::project::Project;

/// projectfs: project disk and recycle bin administration
#[derive(Debug, Parser)]
#[command(name = "projectfs", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the canonical folder of a project
    ResolvePath(resolve::ResolveArgs),
    /// Create a project's folder, descriptor and policy subfolders
    Scaffold(scaffold::ScaffoldArgs),
    /// Folder descriptor maintenance
    Meta(meta::MetaArgs),
    /// Recycle bin administration
    RecycleBin(recycle_bin::RecycleBinArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = load_config(&self.env)?;
        match &self.command {
            Commands::ResolvePath(args) => resolve::execute(args, &config, self.format).await,
            Commands::Scaffold(args) => scaffold::execute(args, &config).await,
            Commands::Meta(args) => meta::execute(args, &config, self.format).await,
            Commands::RecycleBin(args) => recycle_bin::execute(args, &config, self.format).await,
        }
    }
}

/// Which project a command acts on.
///
/// `--number` and `--name` work offline. `--project-id` alone looks the
/// project up in the database.
#[derive(Debug, Clone, Args)]
pub struct ProjectSelector {
    /// Project id
    #[arg(long)]
    pub project_id: Option<String>,
    /// Project number in `YY-MMNNN` form
    #[arg(long, requires = "name")]
    pub number: Option<String>,
    /// Project name
    #[arg(long, requires = "number")]
    pub name: Option<String>,
    /// Owning client id
    #[arg(long)]
    pub client_id: Option<String>,
    /// Region code, overriding the project's own
    #[arg(short, long)]
    pub region: Option<String>,
}

impl ProjectSelector {
    /// Build or look up the selected project.
    pub async fn project(&self, config: &AppConfig) -> anyhow::Result<Project> {
        let id = self
            .project_id
            .as_deref()
            .map(|raw| {
                raw.parse::<ProjectId>()
                    .with_context(|| format!("Invalid project id '{raw}'"))
            })
            .transpose()?;

        let mut project = match (&self.number, &self.name, id) {
            (Some(number), Some(name), _) => {
                let mut project = Project::new(number.as_str(), name.as_str());
                if let Some(id) = id {
                    project.id = id;
                }
                project
            }
            (_, _, Some(id)) => {
                let pool = connect(config).await?;
                let repo = ProjectRepository::new(pool.pool().clone());
                let found = repo.find_by_id(id).await?;
                pool.close().await;
                found.with_context(|| format!("Project {id} not found"))?
            }
            _ => bail!("Select a project with --number and --name, or with --project-id"),
        };

        if let Some(raw) = &self.client_id {
            let client = raw
                .parse::<ClientId>()
                .with_context(|| format!("Invalid client id '{raw}'"))?;
            project = project.with_client(client);
        }
        Ok(project)
    }
}

/// Helper: load configuration for `env`
pub fn load_config(env: &str) -> anyhow::Result<AppConfig> {
    AppConfig::load(env).context("Failed to load config")
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> anyhow::Result<DatabasePool> {
    if !config.database.is_configured() {
        bail!("No database configured; set database.url or PROJECTFS__DATABASE__URL");
    }
    tracing::debug!(
        max_connections = config.database.max_connections,
        timeout_seconds = config.database.connect_timeout_seconds,
        "Connecting to database"
    );
    DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to database")
}
