//! Zip archives of selected project entries.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::result::AppResult;
use projectfs_entity::folder::is_descriptor_name;

/// Zip `entries` (absolute paths inside `base`) into memory. Entry names
/// are relative to `base`; descriptors are left out.
pub async fn build_zip(base: &Path, entries: Vec<PathBuf>) -> AppResult<Vec<u8>> {
    let base = base.to_path_buf();
    tokio::task::spawn_blocking(move || zip_blocking(&base, &entries)).await?
}

fn zip_blocking(base: &Path, entries: &[PathBuf]) -> AppResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        for item in WalkDir::new(entry).sort_by_file_name() {
            let item = item.map_err(|e| AppError::storage(format!("walk failed: {e}")))?;
            let path = item.path();
            if path.file_name().is_some_and(|n| is_descriptor_name(&n.to_string_lossy())) {
                continue;
            }
            let name = path
                .strip_prefix(base)
                .map_err(|_| AppError::validation(format!("{} is outside the project", path.display())))?
                .to_string_lossy()
                .replace('\\', "/");

            if item.file_type().is_dir() {
                zip.add_directory(format!("{name}/"), options).map_err(zip_error)?;
            } else {
                zip.start_file(name, options).map_err(zip_error)?;
                let mut file = File::open(path)
                    .map_err(|e| AppError::io(format!("open {}", path.display()), e))?;
                std::io::copy(&mut file, &mut zip)
                    .map_err(|e| AppError::io(format!("read {}", path.display()), e))?;
            }
        }
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    AppError::with_source(ErrorKind::Storage, "Failed to build zip archive", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn test_zip_contains_relative_entries() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        std::fs::create_dir_all(base.join("Admin/Quotes")).unwrap();
        std::fs::write(base.join("Admin/Quotes/q1.txt"), b"quote").unwrap();
        std::fs::write(base.join("Admin/.meta.json"), b"{}").unwrap();
        std::fs::write(base.join("notes.txt"), b"n").unwrap();

        let bytes = build_zip(base, vec![base.join("Admin"), base.join("notes.txt")])
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"Admin/Quotes/q1.txt".to_string()));
        assert!(names.contains(&"notes.txt".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".meta.json")));

        let mut body = String::new();
        archive
            .by_name("Admin/Quotes/q1.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "quote");
    }
}
