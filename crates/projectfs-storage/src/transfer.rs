//! Moving, copying, sizing, and removing paths on the project disk.
//!
//! Moves try a plain rename first and fall back to a recursive copy
//! followed by a delete of the source (e.g. across devices).

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use projectfs_core::error::AppError;
use projectfs_core::result::AppResult;

/// How a move completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A single rename.
    Renamed,
    /// Copy then delete.
    Copied,
}

/// Move `from` to `to`, creating `to`'s parent.
pub async fn move_path(from: &Path, to: &Path) -> AppResult<MoveOutcome> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::io(format!("create {}", parent.display()), e))?;
    }

    match fs::rename(from, to).await {
        Ok(()) => return Ok(MoveOutcome::Renamed),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::io(format!("move {}", from.display()), e));
        }
        Err(e) => {
            warn!(
                from = %from.display(),
                to = %to.display(),
                error = %e,
                "Rename failed, falling back to copy and delete"
            );
        }
    }

    copy_recursive(from, to).await?;
    remove_path(from).await?;
    Ok(MoveOutcome::Copied)
}

/// Recursively copy `from` (file or directory) to `to`.
pub async fn copy_recursive(from: &Path, to: &Path) -> AppResult<u64> {
    let (from, to) = (from.to_path_buf(), to.to_path_buf());
    tokio::task::spawn_blocking(move || copy_blocking(&from, &to))
        .await?
        .map_err(|e| AppError::io("recursive copy", e))
}

fn copy_blocking(from: &Path, to: &Path) -> io::Result<u64> {
    let mut copied = 0u64;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            copied += std::fs::copy(entry.path(), &target)?;
        }
    }
    debug!(from = %from.display(), to = %to.display(), bytes = copied, "Copied tree");
    Ok(copied)
}

/// Remove a file or a directory tree.
pub async fn remove_path(path: &Path) -> AppResult<()> {
    let meta = fs::symlink_metadata(path)
        .await
        .map_err(|e| AppError::io(format!("stat {}", path.display()), e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    result.map_err(|e| AppError::io(format!("remove {}", path.display()), e))
}

/// Total size in bytes of a file or a directory tree.
pub async fn path_size(path: &Path) -> AppResult<u64> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        WalkDir::new(&path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum::<u64>()
    })
    .await
    .map_err(AppError::from)
}

/// The first free `{stem}_restored_{n}{ext}` sibling of `path`.
///
/// Folders keep their full name as the stem.
pub async fn unique_restore_path(path: &Path, is_dir: bool) -> PathBuf {
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = if is_dir {
        (name, String::new())
    } else {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
            _ => (name, String::new()),
        }
    };

    let mut n = 1u32;
    loop {
        let candidate = parent.join(format!("{stem}_restored_{n}{ext}"));
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}
