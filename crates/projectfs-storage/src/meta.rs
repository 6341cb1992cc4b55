//! `.meta.json` sidecar persistence.
//!
//! A missing or unparsable descriptor reads as `None`; callers fall back to
//! path-based inference. Writes go through a temporary file and a rename.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use projectfs_core::error::AppError;
use projectfs_core::result::AppResult;
use projectfs_entity::folder::{FolderMeta, META_FILE_NAME, META_TMP_FILE_NAME};

/// The sidecar path for `folder`.
pub fn meta_path(folder: &Path) -> PathBuf {
    folder.join(META_FILE_NAME)
}

/// Read and parse the descriptor in `folder`.
pub async fn read_meta(folder: &Path) -> Option<FolderMeta> {
    let path = meta_path(folder);
    let raw = match fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read descriptor");
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unparsable descriptor");
            None
        }
    }
}

/// Write `meta` into `folder`, creating the folder if needed.
pub async fn write_meta(folder: &Path, meta: &FolderMeta) -> AppResult<()> {
    let value = serde_json::to_value(meta)?;
    write_raw(folder, &value).await
}

/// Set one top-level key and stamp `lastUpdated`. Every other key is kept.
pub async fn update_meta(folder: &Path, key: &str, value: Value) -> AppResult<()> {
    let path = meta_path(folder);
    let raw = fs::read(&path)
        .await
        .map_err(|e| AppError::io(format!("read {}", path.display()), e))?;
    let mut doc: serde_json::Map<String, Value> = serde_json::from_slice(&raw).map_err(|e| {
        AppError::validation(format!("descriptor {} is not a JSON object: {e}", path.display()))
    })?;

    doc.insert(key.to_string(), value);
    doc.insert(
        "lastUpdated".to_string(),
        serde_json::to_value(Utc::now())?,
    );
    write_raw(folder, &Value::Object(doc)).await
}

/// Move the descriptor from `old_folder` to `new_folder`.
///
/// Returns `false` when `old_folder` has no descriptor. An existing
/// descriptor at the destination is replaced.
pub async fn move_meta(old_folder: &Path, new_folder: &Path) -> AppResult<bool> {
    let from = meta_path(old_folder);
    let to = meta_path(new_folder);
    if from == to {
        return Ok(fs::try_exists(&from).await.unwrap_or(false));
    }
    match fs::metadata(&from).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(AppError::io(format!("stat {}", from.display()), e)),
    }

    fs::create_dir_all(new_folder)
        .await
        .map_err(|e| AppError::io(format!("create {}", new_folder.display()), e))?;
    fs::rename(&from, &to)
        .await
        .map_err(|e| AppError::io(format!("move {} -> {}", from.display(), to.display()), e))?;
    debug!(from = %from.display(), to = %to.display(), "Moved descriptor");
    Ok(true)
}

async fn write_raw(folder: &Path, value: &Value) -> AppResult<()> {
    fs::create_dir_all(folder)
        .await
        .map_err(|e| AppError::io(format!("create {}", folder.display()), e))?;

    let path = meta_path(folder);
    let tmp = folder.join(META_TMP_FILE_NAME);
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, &body)
        .await
        .map_err(|e| AppError::io(format!("write {}", tmp.display()), e))?;
    fs::rename(&tmp, &path)
        .await
        .map_err(|e| AppError::io(format!("replace {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample(project_id: &str) -> FolderMeta {
        let mut roles = BTreeMap::new();
        roles.insert("Admin".to_string(), vec!["Admin".to_string()]);
        FolderMeta::new(project_id, roles, vec!["Admin".to_string()], Utc::now())
    }

    #[tokio::test]
    async fn test_absent_and_garbage_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_meta(dir.path()).await.is_none());
        fs::write(meta_path(dir.path()), b"{not json").await.unwrap();
        assert!(read_meta(dir.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let meta = sample("p-1");
        write_meta(dir.path(), &meta).await.unwrap();
        assert_eq!(read_meta(dir.path()).await, Some(meta));
        assert!(!dir.path().join(".meta.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_update_keeps_other_keys_and_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let mut meta = sample("p-1");
        meta.extra
            .insert("owner".into(), Value::String("estimating".into()));
        write_meta(dir.path(), &meta).await.unwrap();

        update_meta(dir.path(), "structure", serde_json::json!(["Admin", "Project"]))
            .await
            .unwrap();

        let updated = read_meta(dir.path()).await.unwrap();
        assert_eq!(updated.structure, vec!["Admin", "Project"]);
        assert!(updated.last_updated.is_some());
        assert_eq!(updated.extra.get("owner"), Some(&Value::String("estimating".into())));
        assert_eq!(updated.created_at, meta.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = update_meta(dir.path(), "x", Value::Null).await.unwrap_err();
        assert_eq!(err.kind, projectfs_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_move_meta() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        write_meta(&old, &sample("p-2")).await.unwrap();

        assert!(move_meta(&old, &new).await.unwrap());
        assert!(read_meta(&old).await.is_none());
        assert_eq!(read_meta(&new).await.unwrap().project_id, "p-2");
        assert!(!move_meta(&old, &new).await.unwrap());
    }
}
