use chrono::Local;
use std::path::{Path, PathBuf};

use crate::error::ThumbnailError;
use crate::services::path::{split_extension, timestamp_stamp};

/// Target thumbnail width in pixels
pub const THUMBNAIL_WIDTH: u32 = 320;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Whether `name` carries one of the thumbnail-capable image extensions,
/// case-insensitively.
pub fn is_image_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, extension)) => IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Derive a resized companion artifact for an image file.
///
/// The output lands in the OS temp directory as
/// `{base}_{YYYYMMDDHHmmss}_{width}{ext}`; the caller deletes it once it has
/// been uploaded or abandoned. Aspect ratio is preserved and a source already
/// narrower than `width` is copied through at its native size.
pub async fn derive_thumbnail(source: &Path, width: u32) -> Result<PathBuf, ThumbnailError> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !is_image_file(file_name) {
        return Err(ThumbnailError::UnsupportedImage {
            name: file_name.to_string(),
        });
    }

    let (base, extension) = split_extension(file_name);
    let stamp = timestamp_stamp(Local::now());
    let target = std::env::temp_dir().join(format!("{base}_{stamp}_{width}{extension}"));

    let source = source.to_path_buf();
    let output = target.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ThumbnailError> {
        let img = image::open(&source)?;
        let resized = if img.width() > width {
            img.thumbnail(width, u32::MAX)
        } else {
            img
        };
        resized.save(&output)?;
        Ok(())
    })
    .await
    .map_err(|e| ThumbnailError::Task(e.to_string()))??;

    Ok(target)
}
