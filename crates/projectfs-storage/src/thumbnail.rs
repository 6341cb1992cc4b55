//! Thumbnail generation for recycled images.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use tokio::fs;

use projectfs_core::error::{AppError, ErrorKind};
use projectfs_core::result::AppResult;
use projectfs_core::types::ClientId;

/// Extensions that get a preview.
const SUPPORTED: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Writes JPEG previews to `{output_dir}/client_{clientId}/{millis}_thumb.jpg`.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    output_dir: PathBuf,
    size: u32,
}

impl ThumbnailGenerator {
    /// Create a generator writing below `output_dir`, bounding the longest
    /// edge to `size` pixels.
    pub fn new(output_dir: impl Into<PathBuf>, size: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            size: size.max(1),
        }
    }

    /// Whether `file_name` has a previewable extension.
    pub fn is_supported(file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| SUPPORTED.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Where the preview for `(client_id, stamp)` goes.
    pub fn thumbnail_path(&self, client_id: ClientId, stamp_millis: i64) -> PathBuf {
        self.output_dir
            .join(format!("client_{client_id}"))
            .join(format!("{stamp_millis}_thumb.jpg"))
    }

    /// Decode `source`, shrink it, and write the JPEG preview.
    pub async fn generate(
        &self,
        source: &Path,
        client_id: ClientId,
        stamp_millis: i64,
    ) -> AppResult<PathBuf> {
        let target = self.thumbnail_path(client_id, stamp_millis);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(format!("create {}", parent.display()), e))?;
        }

        let (source_buf, target_buf, size) = (source.to_path_buf(), target.clone(), self.size);
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let img = image::open(&source_buf).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to decode {}", source_buf.display()),
                    e,
                )
            })?;
            img.thumbnail(size, size)
                .into_rgb8()
                .save_with_format(&target_buf, ImageFormat::Jpeg)
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to encode thumbnail", e)
                })
        })
        .await??;

        tracing::debug!(
            source = %source.display(),
            output = %target.display(),
            size = self.size,
            "Generated thumbnail"
        );
        Ok(target)
    }

    /// Delete a preview. Missing files are fine.
    pub async fn remove(&self, path: &Path) -> AppResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::io(format!("remove {}", path.display()), e)),
        }
    }
}
