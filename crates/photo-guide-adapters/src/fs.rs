//! Filesystem adapter for reading uploads and writing downloaded images.

use std::path::Path;

use anyhow::{Context, Result};
use photo_guide_core::{ImageDimensions, Upload, UploadPolicy};
use tracing::{debug, warn};

/// Loads a photo from disk for upload.
///
/// The extension and size are checked against `policy` before the file is
/// read. Dimensions come from the image header only; a header that cannot
/// be parsed is logged and leaves `dimensions` empty, since the service
/// decides what it accepts.
///
/// # Errors
///
/// Returns an error if the path is not a file, violates the policy, or
/// cannot be read.
pub fn load_upload(path: &Path, policy: &UploadPolicy) -> Result<Upload> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to access {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?
        .to_string();

    policy
        .check(&file_name, metadata.len())
        .with_context(|| format!("Cannot upload {}", path.display()))?;

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut upload = Upload::new(file_name, bytes);

    match read_dimensions(path) {
        Ok(dimensions) => {
            debug!("{}: {dimensions}", path.display());
            upload = upload.with_dimensions(dimensions);
        }
        Err(e) => warn!("Could not read image header of {}: {e:#}", path.display()),
    }

    Ok(upload)
}

/// Reads width and height from the image header without decoding pixels.
fn read_dimensions(path: &Path) -> Result<ImageDimensions> {
    let (width, height) = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ImageDimensions::new(width, height))
}

/// Writes image bytes to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn save_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_error() {
        let err = load_upload(Path::new("/nonexistent/photo.jpg"), &UploadPolicy::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to access"));
    }

    #[test]
    fn test_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_upload(dir.path(), &UploadPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("Not a file"));
    }
}
