//! Port for the remote composition and generation service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CompositionAnalysis, GenerationRequest, GenerationResult, Genre, Upload};

/// Reply of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status, `"healthy"` when all is well.
    pub status: String,
    /// Service name, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl HealthStatus {
    /// Whether the service reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Failure talking to the service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure.
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server returned {status}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `detail` field from the error body, if any.
        detail: Option<String>,
    },
    /// The body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
    /// The body decoded but violates the protocol (e.g. scores out of range).
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Server-provided explanation, if the failure carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Port for the backend that scores compositions and regenerates images.
pub trait CompositionService: Send + Sync {
    /// Uploads a photo for composition analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is invalid.
    fn analyze(&self, upload: &Upload, genre: Genre) -> Result<CompositionAnalysis, ApiError>;

    /// Uploads the original photo with improvement instructions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is invalid.
    fn generate(
        &self,
        upload: &Upload,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiError>;

    /// Checks whether the service is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached.
    fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Downloads a generated image referenced by a result's `image_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_keeps_detail_out_of_display() {
        let err = ApiError::Server {
            status: 400,
            detail: Some("File must be an image".into()),
        };
        assert_eq!(err.to_string(), "server returned 400");
        assert_eq!(err.detail(), Some("File must be an image"));
    }

    #[test]
    fn test_server_error_display_without_detail() {
        let err = ApiError::Server {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "server returned 502");
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_health_status() {
        let ok = HealthStatus {
            status: "healthy".into(),
            service: None,
        };
        assert!(ok.is_healthy());
        let bad = HealthStatus {
            status: "degraded".into(),
            service: Some("Photo Guide API".into()),
        };
        assert!(!bad.is_healthy());
    }
}
