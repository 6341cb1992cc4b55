//! Recursive folder walk and descriptor-based fallback lookup.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use projectfs_core::error::AppError;
use projectfs_core::result::AppResult;
use projectfs_entity::folder::{FILES_KEY, FolderNode, META_FILE_NAME, is_descriptor_name};

use crate::meta;

/// Walk `root` into a [`FolderNode`]. A missing root yields an empty tree.
pub async fn walk_tree(root: &Path) -> AppResult<FolderNode> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || match walk_dir(&root) {
        Ok(node) => Ok(node),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FolderNode::new()),
        Err(e) => Err(AppError::io(format!("walk {}", root.display()), e)),
    })
    .await?
}

fn walk_dir(dir: &Path) -> io::Result<FolderNode> {
    let mut node = FolderNode::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Skipping entry without type");
                continue;
            }
        };

        if file_type.is_dir() {
            if name == FILES_KEY {
                continue;
            }
            match walk_dir(&entry.path()) {
                Ok(child) => {
                    node.folders.insert(name, child);
                }
                // Removed between listing and descent.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        } else if !is_descriptor_name(&name) {
            node.files.push(name);
        }
    }
    node.files.sort();
    Ok(node)
}

/// Scan `{region_dir}/*/*/*/.meta.json` for a descriptor naming
/// `project_id` and return its folder.
pub async fn find_by_meta(region_dir: &Path, project_id: &str) -> AppResult<Option<PathBuf>> {
    let region_dir = region_dir.to_path_buf();
    let candidates = tokio::task::spawn_blocking(move || {
        WalkDir::new(&region_dir)
            .min_depth(3)
            .max_depth(3)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .filter(|p| p.join(META_FILE_NAME).is_file())
            .collect::<Vec<_>>()
    })
    .await?;

    debug!(count = candidates.len(), project_id, "Scanning descriptors");
    for folder in candidates {
        if let Some(found) = meta::read_meta(&folder).await {
            if found.belongs_to(project_id) {
                return Ok(Some(folder));
            }
        }
    }
    Ok(None)
}

/// Every project folder below `root` that carries a descriptor, across
/// all regions.
pub async fn list_meta_folders(root: &Path) -> AppResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let folders = tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .min_depth(4)
            .max_depth(4)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .filter(|p| p.join(META_FILE_NAME).is_file())
            .collect::<Vec<_>>()
    })
    .await?;
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[tokio::test]
    async fn test_shape_independent_of_creation_order() {
        let first = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(first.path().join("A/B")).unwrap();
        touch(&first.path().join("A/x.txt"));
        touch(&first.path().join("A/B/y.txt"));

        let second = tempfile::tempdir().unwrap();
        touch(&second.path().join("A/B/y.txt"));
        touch(&second.path().join("A/x.txt"));

        let a = serde_json::to_value(walk_tree(first.path()).await.unwrap()).unwrap();
        let b = serde_json::to_value(walk_tree(second.path()).await.unwrap()).unwrap();
        let expected = serde_json::json!({"A": {"__files": ["x.txt"], "B": {"__files": ["y.txt"]}}});
        assert_eq!(a, expected);
        assert_eq!(b, expected);
    }

    #[tokio::test]
    async fn test_skips_sidecar_and_reserved_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(META_FILE_NAME));
        touch(&dir.path().join("__files/hidden.txt"));
        touch(&dir.path().join("Admin/.meta.json"));
        touch(&dir.path().join("Admin/quote.pdf"));
        std::fs::create_dir_all(dir.path().join("Estimator")).unwrap();

        let tree = walk_tree(dir.path()).await.unwrap();
        assert!(tree.files.is_empty());
        let names: BTreeSet<_> = tree.folders.keys().cloned().collect();
        assert_eq!(names, BTreeSet::from(["Admin".to_string(), "Estimator".to_string()]));
        assert_eq!(tree.folders["Admin"].files, vec!["quote.pdf"]);
    }

    #[tokio::test]
    async fn test_descriptor_lookalikes_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(META_FILE_NAME));
        touch(&dir.path().join(".meta.json.tmp"));
        touch(&dir.path().join(".meta.json.bak"));
        touch(&dir.path().join("site.meta.json"));

        let tree = walk_tree(dir.path()).await.unwrap();
        assert_eq!(tree.files, vec![".meta.json.bak", "site.meta.json"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tree = walk_tree(&dir.path().join("nope")).await.unwrap();
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_meta() {
        let dir = tempfile::tempdir().unwrap();
        let region = dir.path().join("AU");
        let renamed = region.join("2025/10. Oct/25-10003 - Old Name");
        std::fs::create_dir_all(&renamed).unwrap();
        std::fs::write(
            renamed.join(META_FILE_NAME),
            br#"{"projectId":"abc","createdAt":"2025-10-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(find_by_meta(&region, "abc").await.unwrap(), Some(renamed));
        assert_eq!(find_by_meta(&region, "zzz").await.unwrap(), None);
        assert_eq!(list_meta_folders(dir.path()).await.unwrap().len(), 1);
    }
}
