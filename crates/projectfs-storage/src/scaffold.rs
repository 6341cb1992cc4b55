//! Project folder scaffolding.

use std::path::Path;

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use projectfs_core::config::FolderPolicyConfig;
use projectfs_core::error::AppError;
use projectfs_core::result::AppResult;
use projectfs_entity::folder::FolderMeta;
use projectfs_entity::project::Project;

use crate::layout::{DiskRoot, PathResolution};
use crate::meta;

/// Creates project roots, their descriptor, and the policy subfolders.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    root: DiskRoot,
    policy: FolderPolicyConfig,
}

impl Scaffolder {
    /// Create a scaffolder for `root` using `policy`.
    pub fn new(root: DiskRoot, policy: FolderPolicyConfig) -> Self {
        Self { root, policy }
    }

    /// The disk root in use.
    pub fn disk_root(&self) -> &DiskRoot {
        &self.root
    }

    /// The access policy in use.
    pub fn policy(&self) -> &FolderPolicyConfig {
        &self.policy
    }

    /// A fresh descriptor for `project_id` under the current policy.
    pub fn descriptor(&self, project_id: &str) -> FolderMeta {
        FolderMeta::new(
            project_id,
            self.policy.allowed_roles(),
            self.policy.structure(),
            Utc::now(),
        )
    }

    /// Resolve the project's root and scaffold it.
    ///
    /// Returns `false` without touching the disk when the project's
    /// identifiers cannot produce a path.
    pub async fn create_initial_folders(
        &self,
        project: &Project,
        region: Option<&str>,
    ) -> AppResult<bool> {
        let folder = match self.root.project_root(project, region) {
            PathResolution::Resolved(p) => p,
            PathResolution::Invalid(reason) => {
                warn!(project_id = %project.id, %reason, "Cannot scaffold project folder");
                return Ok(false);
            }
        };
        self.scaffold_at(&project.id.to_string(), &folder).await?;
        Ok(true)
    }

    /// Scaffold `folder` for `project_id`: root, descriptor, and every
    /// policy subfolder that is missing. Existing directories are left alone.
    pub async fn scaffold_at(&self, project_id: &str, folder: &Path) -> AppResult<()> {
        self.ensure_root(project_id, folder).await?;

        for name in self.policy.structure() {
            let sub = folder.join(&name);
            match fs::metadata(&sub).await {
                Ok(m) if m.is_dir() => continue,
                Ok(_) => {
                    warn!(path = %sub.display(), "Policy folder name is taken by a file");
                    continue;
                }
                Err(_) => {}
            }
            fs::create_dir_all(&sub)
                .await
                .map_err(|e| AppError::io(format!("create {}", sub.display()), e))?;
            debug!(path = %sub.display(), "Created policy folder");
        }

        info!(project_id, folder = %folder.display(), "Project folder scaffolded");
        Ok(())
    }

    /// Create `folder` and make sure it carries a descriptor for
    /// `project_id`. Subfolders are not created.
    ///
    /// A descriptor already belonging to the project keeps its `createdAt`
    /// and unknown keys and is only rewritten when the policy changed.
    pub async fn ensure_root(&self, project_id: &str, folder: &Path) -> AppResult<()> {
        fs::create_dir_all(folder)
            .await
            .map_err(|e| AppError::io(format!("create {}", folder.display()), e))?;

        let desired = match meta::read_meta(folder).await {
            Some(existing) if existing.belongs_to(project_id) => {
                if existing.allowed_roles == self.policy.allowed_roles()
                    && existing.structure == self.policy.structure()
                {
                    return Ok(());
                }
                self.apply_policy(existing)
            }
            Some(foreign) => {
                warn!(
                    folder = %folder.display(),
                    found = %foreign.project_id,
                    expected = project_id,
                    "Descriptor belongs to another project, replacing"
                );
                self.descriptor(project_id)
            }
            None => self.descriptor(project_id),
        };

        meta::write_meta(folder, &desired).await
    }

    /// Rewrite `allowedRoles` and `structure` of the descriptor in `folder`
    /// to the current policy. Returns whether anything changed.
    pub async fn migrate_policy(&self, folder: &Path) -> AppResult<bool> {
        let Some(existing) = meta::read_meta(folder).await else {
            return Ok(false);
        };
        if existing.allowed_roles == self.policy.allowed_roles()
            && existing.structure == self.policy.structure()
        {
            return Ok(false);
        }
        let updated = self.apply_policy(existing);
        meta::write_meta(folder, &updated).await?;
        Ok(true)
    }

    fn apply_policy(&self, mut meta: FolderMeta) -> FolderMeta {
        meta.allowed_roles = self.policy.allowed_roles();
        meta.structure = self.policy.structure();
        meta.last_updated = Some(Utc::now());
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projectfs_core::config::FolderRule;

    fn scaffolder(root: &Path) -> Scaffolder {
        Scaffolder::new(DiskRoot::new(root, "AU"), FolderPolicyConfig::default())
    }

    fn subdirs(path: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(path)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_scaffold_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let s = scaffolder(dir.path());
        let project = Project::new("25-10003", "Tower");

        assert!(s.create_initial_folders(&project, None).await.unwrap());
        let folder = dir.path().join("AU/2025/10. Oct/25-10003 - Tower");
        let first = meta::read_meta(&folder).await.unwrap();
        std::fs::write(folder.join("Admin/keep.txt"), b"x").unwrap();

        assert!(s.create_initial_folders(&project, None).await.unwrap());
        let second = meta::read_meta(&folder).await.unwrap();

        assert_eq!(subdirs(&folder), vec!["Admin", "Estimator", "Project"]);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.project_id, project.id.to_string());
        assert!(folder.join("Admin/keep.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_project_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let s = scaffolder(dir.path());
        let project = Project::new("25-13003", "Bad month");
        assert!(!s.create_initial_folders(&project, None).await.unwrap());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_partial_scaffold_heals() {
        let dir = tempfile::tempdir().unwrap();
        let s = scaffolder(dir.path());
        let project = Project::new("25-10003", "Tower");
        let folder = dir.path().join("AU/2025/10. Oct/25-10003 - Tower");
        s.ensure_root(&project.id.to_string(), &folder).await.unwrap();
        assert!(subdirs(&folder).is_empty());

        s.create_initial_folders(&project, None).await.unwrap();
        assert_eq!(subdirs(&folder).len(), 3);
    }

    #[tokio::test]
    async fn test_migrate_policy_rewrites_roles() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::new("25-10003", "Tower");
        scaffolder(dir.path())
            .create_initial_folders(&project, None)
            .await
            .unwrap();

        let policy = FolderPolicyConfig {
            access: vec![
                FolderRule::new("Project", &["Admin", "User"]),
                FolderRule::new("Drawings", &["Admin", "Drafter"]),
            ],
        };
        let migrated = Scaffolder::new(DiskRoot::new(dir.path(), "AU"), policy);
        let folder = dir.path().join("AU/2025/10. Oct/25-10003 - Tower");
        assert!(migrated.migrate_policy(&folder).await.unwrap());
        assert!(!migrated.migrate_policy(&folder).await.unwrap());

        let meta = meta::read_meta(&folder).await.unwrap();
        assert_eq!(meta.structure, vec!["Project", "Drawings"]);
        assert!(meta.allowed_roles.contains_key("Drawings"));
        assert!(meta.last_updated.is_some());
    }
}
