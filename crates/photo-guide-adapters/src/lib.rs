//! Photo Guide Adapters - External adapters for photo-guide.
//!
//! This crate provides adapters for:
//! - Loading photos from the filesystem for upload
//! - Talking to the composition service over HTTP

pub mod fs;
pub mod http;

pub use fs::{load_upload, save_image};
pub use http::{ClientConfig, HttpClient, DEFAULT_API_PREFIX, DEFAULT_BASE_URL};
