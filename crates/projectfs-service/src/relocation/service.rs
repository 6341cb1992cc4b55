//! Moves a project's disk tree to its new canonical path.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use tokio::fs;
use tracing::{info, warn};

use projectfs_core::result::AppResult;
use projectfs_entity::project::Project;
use projectfs_storage::layout::PathResolution;
use projectfs_storage::transfer::{MoveOutcome, move_path};
use projectfs_storage::{Scaffolder, meta};

/// What a relocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationAction {
    /// Old and new paths are the same.
    Unchanged,
    /// Nothing existed yet; the new path was scaffolded.
    Scaffolded,
    /// Atomic rename.
    Renamed,
    /// Copy then delete.
    Copied,
    /// The destination was occupied; nothing moved.
    Conflict,
    /// Resolution or I/O failure.
    Failed,
    /// A failed relocation was followed by a scaffold at the new path.
    Repaired,
}

/// Result of [`Relocator::relocate_project_folder`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationOutcome {
    /// Whether the project folder now lives at the new path.
    pub success: bool,
    /// Why it does not, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// What happened.
    pub action: RelocationAction,
    /// Old canonical path, when resolvable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<PathBuf>,
    /// New canonical path, when resolvable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
}

impl RelocationOutcome {
    fn done(action: RelocationAction, from: Option<PathBuf>, to: PathBuf) -> Self {
        Self {
            success: true,
            reason: None,
            action,
            from,
            to: Some(to),
        }
    }

    fn failed(
        action: RelocationAction,
        reason: impl Into<String>,
        from: Option<PathBuf>,
        to: Option<PathBuf>,
    ) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            action,
            from,
            to,
        }
    }
}

/// Keeps on-disk project folders in step with project identity changes.
#[derive(Debug, Clone)]
pub struct Relocator {
    scaffolder: Scaffolder,
}

impl Relocator {
    /// Creates a new relocator.
    pub fn new(scaffolder: Scaffolder) -> Self {
        Self { scaffolder }
    }

    /// Move the folder of `old` to where `new` resolves.
    ///
    /// Never overwrites: an occupied destination leaves both trees as they
    /// were. Failures come back as an unsuccessful outcome, not an error.
    pub async fn relocate_project_folder(
        &self,
        old: &Project,
        new: &Project,
        region: Option<&str>,
    ) -> RelocationOutcome {
        let root = self.scaffolder.disk_root();
        let to = match root.project_root(new, region) {
            PathResolution::Resolved(p) => p,
            PathResolution::Invalid(reason) => {
                warn!(project_id = %new.id, %reason, "Cannot resolve new project folder");
                return RelocationOutcome::failed(RelocationAction::Failed, reason, None, None);
            }
        };
        let from = match root.project_root(old, region) {
            PathResolution::Resolved(p) => p,
            PathResolution::Invalid(reason) => {
                // Nothing could have been created under an unresolvable name.
                warn!(project_id = %old.id, %reason, "Old project folder unresolvable, scaffolding new path");
                return self.scaffold_new(new, None, to).await;
            }
        };

        if from == to {
            return RelocationOutcome::done(RelocationAction::Unchanged, Some(from), to);
        }
        if !exists(&from).await {
            return self.scaffold_new(new, Some(from), to).await;
        }
        if exists(&to).await {
            warn!(from = %from.display(), to = %to.display(), "Relocation target already exists");
            return RelocationOutcome::failed(
                RelocationAction::Conflict,
                format!("{} already exists", to.display()),
                Some(from),
                Some(to),
            );
        }

        let action = match move_path(&from, &to).await {
            Ok(MoveOutcome::Renamed) => RelocationAction::Renamed,
            Ok(MoveOutcome::Copied) => RelocationAction::Copied,
            Err(e) => {
                warn!(from = %from.display(), to = %to.display(), error = %e, "Project folder relocation failed");
                return RelocationOutcome::failed(
                    RelocationAction::Failed,
                    e.to_string(),
                    Some(from),
                    Some(to),
                );
            }
        };

        if let Err(e) = self.settle_descriptor(new, &from, &to).await {
            warn!(to = %to.display(), error = %e, "Relocated folder but could not update its descriptor");
        }

        info!(
            project_id = %new.id,
            from = %from.display(),
            to = %to.display(),
            ?action,
            "Project folder relocated"
        );
        RelocationOutcome::done(action, Some(from), to)
    }

    /// Relocate, and on failure scaffold the new path so the project still
    /// has a usable folder.
    pub async fn relocate_or_repair(
        &self,
        old: &Project,
        new: &Project,
        region: Option<&str>,
    ) -> RelocationOutcome {
        let outcome = self.relocate_project_folder(old, new, region).await;
        if outcome.success || outcome.action == RelocationAction::Conflict {
            return outcome;
        }
        match self.scaffolder.create_initial_folders(new, region).await {
            Ok(true) => RelocationOutcome {
                action: RelocationAction::Repaired,
                ..outcome
            },
            Ok(false) => outcome,
            Err(e) => {
                warn!(project_id = %new.id, error = %e, "Repair scaffold failed");
                outcome
            }
        }
    }

    async fn scaffold_new(
        &self,
        new: &Project,
        from: Option<PathBuf>,
        to: PathBuf,
    ) -> RelocationOutcome {
        match self.scaffolder.scaffold_at(&new.id.to_string(), &to).await {
            Ok(()) => RelocationOutcome::done(RelocationAction::Scaffolded, from, to),
            Err(e) => RelocationOutcome::failed(
                RelocationAction::Failed,
                e.to_string(),
                from,
                Some(to),
            ),
        }
    }

    /// The descriptor travels with the directory; make sure it is there and
    /// stamped, re-creating it if the old folder never had one.
    async fn settle_descriptor(&self, new: &Project, from: &Path, to: &Path) -> AppResult<()> {
        if meta::read_meta(to).await.is_none() && !meta::move_meta(from, to).await? {
            return self.scaffolder.ensure_root(&new.id.to_string(), to).await;
        }
        meta::update_meta(to, "projectFolder", json!(new.folder_name())).await
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
