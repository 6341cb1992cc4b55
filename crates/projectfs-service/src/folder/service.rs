//! Folder tree synchronization and folder CRUD on the project disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::result::AppResult;
use projectfs_core::types::ProjectId;
use projectfs_database::ProjectDirectory;
use projectfs_entity::folder::{FILES_KEY, FolderMeta, FolderNode, META_FILE_NAME};
use projectfs_entity::project::Project;
use projectfs_storage::layout::{PathResolution, safe_relative};
use projectfs_storage::{DiskRoot, Scaffolder, meta, tree};

/// Resolves project folders and serves tree and folder operations.
#[derive(Clone)]
pub struct FolderService {
    /// Read-only project lookup.
    projects: Arc<dyn ProjectDirectory>,
    /// Scaffolder (carries the disk root and folder policy).
    scaffolder: Scaffolder,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService")
            .field("root", &self.scaffolder.disk_root().root())
            .finish()
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(projects: Arc<dyn ProjectDirectory>, scaffolder: Scaffolder) -> Self {
        Self {
            projects,
            scaffolder,
        }
    }

    /// The disk root in use.
    pub fn disk_root(&self) -> &DiskRoot {
        self.scaffolder.disk_root()
    }

    /// The scaffolder in use.
    pub fn scaffolder(&self) -> &Scaffolder {
        &self.scaffolder
    }

    /// Look up a project or fail with `NotFound`.
    pub async fn find_project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))
    }

    /// Locate the project's folder on disk.
    ///
    /// Uses the deterministic path when it exists (re-deriving a missing
    /// descriptor), then a descriptor scan of the region, and finally
    /// creates the root with a descriptor at the deterministic path.
    pub async fn locate_project_root(
        &self,
        project: &Project,
        region: Option<&str>,
    ) -> AppResult<PathBuf> {
        let project_key = project.id.to_string();
        let deterministic = match self.disk_root().project_root(project, region) {
            PathResolution::Resolved(p) => p,
            PathResolution::Invalid(reason) => return Err(AppError::validation(reason)),
        };

        if is_dir(&deterministic).await {
            if meta::read_meta(&deterministic).await.is_none() {
                info!(
                    project_id = %project.id,
                    folder = %deterministic.display(),
                    "Re-deriving missing project descriptor"
                );
                self.scaffolder.ensure_root(&project_key, &deterministic).await?;
            }
            return Ok(deterministic);
        }

        let region_dir = self
            .disk_root()
            .region_dir(&self.disk_root().region_for(project, region));
        if let Some(found) = tree::find_by_meta(&region_dir, &project_key).await? {
            warn!(
                project_id = %project.id,
                expected = %deterministic.display(),
                found = %found.display(),
                "Project folder found by descriptor away from its canonical path"
            );
            return Ok(found);
        }

        info!(project_id = %project.id, folder = %deterministic.display(), "Creating missing project root");
        self.scaffolder.ensure_root(&project_key, &deterministic).await?;
        Ok(deterministic)
    }

    /// Build the folder tree for a project.
    ///
    /// A project whose identifiers cannot produce a path yields an empty
    /// tree; only a missing project record is an error.
    pub async fn build_folder_tree(
        &self,
        project_id: ProjectId,
        region: Option<&str>,
    ) -> AppResult<FolderNode> {
        let project = self.find_project(project_id).await?;
        let root = match self.locate_project_root(&project, region).await {
            Ok(root) => root,
            Err(e) if e.is(ErrorKind::Validation) => {
                warn!(%project_id, reason = %e.message, "Cannot resolve project folder, returning empty tree");
                return Ok(FolderNode::new());
            }
            Err(e) => return Err(e),
        };

        let node = tree::walk_tree(&root).await?;
        debug!(
            %project_id,
            folders = node.folder_count(),
            files = node.file_count(),
            "Built folder tree"
        );
        Ok(node)
    }

    /// The project's root descriptor, if any.
    pub async fn read_root_meta(
        &self,
        project_id: ProjectId,
        region: Option<&str>,
    ) -> AppResult<Option<FolderMeta>> {
        let project = self.find_project(project_id).await?;
        let root = self.locate_project_root(&project, region).await?;
        Ok(meta::read_meta(&root).await)
    }

    /// Resolve `relative` inside the project's folder without requiring
    /// it to exist.
    pub async fn resolve_path(
        &self,
        project: &Project,
        region: Option<&str>,
        relative: &str,
    ) -> AppResult<PathBuf> {
        let root = self.locate_project_root(project, region).await?;
        let rel = safe_relative(relative).map_err(AppError::validation)?;
        Ok(root.join(rel))
    }

    /// Resolve an existing entry inside the project's folder.
    pub async fn resolve_existing(
        &self,
        project: &Project,
        region: Option<&str>,
        relative: &str,
    ) -> AppResult<PathBuf> {
        let path = self.resolve_path(project, region, relative).await?;
        if relative.trim_matches('/').is_empty() {
            return Err(AppError::validation("The project root itself cannot be targeted"));
        }
        match fs::symlink_metadata(&path).await {
            Ok(_) => Ok(path),
            Err(e) => Err(AppError::io(format!("'{relative}'"), e)),
        }
    }

    /// Create `name` below `parent`. Losing a race against another creator
    /// reports `Conflict`.
    pub async fn create_folder(
        &self,
        project_id: ProjectId,
        region: Option<&str>,
        parent: &str,
        name: &str,
    ) -> AppResult<PathBuf> {
        validate_name(name)?;
        let project = self.find_project(project_id).await?;
        let parent_path = self.resolve_path(&project, region, parent).await?;
        if !is_dir(&parent_path).await {
            return Err(AppError::not_found(format!("Parent folder '{parent}' does not exist")));
        }

        let target = parent_path.join(name);
        match fs::create_dir(&target).await {
            Ok(()) => {
                info!(%project_id, folder = %target.display(), "Folder created");
                Ok(target)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(AppError::conflict(
                format!("'{name}' already exists in '{parent}'"),
            )),
            Err(e) => Err(AppError::io(format!("create {}", target.display()), e)),
        }
    }

    /// Rename the entry at `relative` to `new_name` in the same parent.
    pub async fn rename_entry(
        &self,
        project_id: ProjectId,
        region: Option<&str>,
        relative: &str,
        new_name: &str,
    ) -> AppResult<PathBuf> {
        validate_name(new_name)?;
        let project = self.find_project(project_id).await?;
        let source = self.resolve_existing(&project, region, relative).await?;
        let target = source
            .parent()
            .map(|p| p.join(new_name))
            .ok_or_else(|| AppError::validation("Entry has no parent folder"))?;

        if target == source {
            return Ok(target);
        }
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Err(AppError::conflict(format!("'{new_name}' already exists")));
        }
        fs::rename(&source, &target)
            .await
            .map_err(|e| AppError::io(format!("rename {}", source.display()), e))?;
        info!(%project_id, from = %source.display(), to = %target.display(), "Entry renamed");
        Ok(target)
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed != name {
        return Err(AppError::validation("Name cannot start or end with whitespace"));
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(AppError::validation(format!("'{name}' is not a valid name")));
    }
    if name == FILES_KEY || name.starts_with(META_FILE_NAME) {
        return Err(AppError::validation(format!("'{name}' is reserved")));
    }
    Ok(())
}
