//! The photo being sent to the service and the rules it must satisfy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upload limit (10 MiB), mirroring the service.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions the service accepts.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Pixel dimensions read from the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new image dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A photo ready to be posted as the `file` form part.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the payload.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Dimensions, when the header could be read.
    pub dimensions: Option<ImageDimensions>,
}

impl Upload {
    /// Creates an upload, deriving the content type from the file name.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
            dimensions: None,
        }
    }

    /// Attaches header dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: ImageDimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payload bytes are noise in logs.
impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

/// Why a file cannot be uploaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// Extension not in the allow-list.
    #[error("unsupported file type '{extension}' (allowed: {allowed})")]
    UnsupportedType {
        /// Offending extension, lowercased; empty when missing.
        extension: String,
        /// Comma-separated allow-list.
        allowed: String,
    },
    /// File exceeds the size limit.
    #[error("file is too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Limit.
        max: u64,
    },
    /// Zero-byte file.
    #[error("file is empty")]
    Empty,
}

/// Upload constraints checked before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Maximum payload size in bytes.
    pub max_bytes: u64,
    /// Accepted extensions, lowercase, without dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl UploadPolicy {
    /// Policy with a custom size limit and the default extensions.
    #[must_use]
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Checks a file name and size against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint: type, then emptiness, then size.
    pub fn check(&self, file_name: &str, len: u64) -> Result<(), UploadError> {
        let extension = extension_of(file_name);
        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(UploadError::UnsupportedType {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }
        if len == 0 {
            return Err(UploadError::Empty);
        }
        if len > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: len,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// MIME type for a file name, by extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
