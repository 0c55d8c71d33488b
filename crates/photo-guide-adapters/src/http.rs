//! HTTP adapter for the composition service.
//!
//! Both endpoints take `multipart/form-data` with the photo in the `file`
//! part and answer with JSON. Errors follow the FastAPI convention of a
//! `{"detail": ...}` body.

use std::time::Duration;

use anyhow::{Context, Result};
use photo_guide_core::{
    ApiError, CompositionAnalysis, CompositionService, GenerationRequest, GenerationResult, Genre,
    HealthStatus, Upload,
};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default API prefix.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

const ANALYZE_ENDPOINT: &str = "/analyze-composition";
const GENERATE_ENDPOINT: &str = "/generate-nanobanana";

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Prefix the API routes are mounted under.
    pub api_prefix: String,
    /// Timeout for analysis, health and download requests.
    pub timeout: Duration,
    /// Timeout for generation, which runs a generative model.
    pub generation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_prefix: DEFAULT_API_PREFIX.into(),
            timeout: Duration::from_secs(30),
            generation_timeout: Duration::from_secs(120),
        }
    }
}

/// Blocking HTTP client implementing [`CompositionService`].
pub struct HttpClient {
    client: Client,
    base: Url,
    api_root: String,
    config: ClientConfig,
}

impl HttpClient {
    /// Creates a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid server URL: {}", config.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https: {}", config.base_url);
        }

        let client = Client::builder()
            .user_agent(concat!("photo-guide/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        let api_root = join_root(&config.base_url, &config.api_prefix);
        debug!("API root: {api_root}");

        Ok(Self {
            client,
            base,
            api_root,
            config,
        })
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of an API endpoint.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// Resolves an `image_url` from a generation result against the server root.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Protocol`] if the URL cannot be resolved.
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        self.base
            .join(url)
            .map_err(|e| ApiError::Protocol(format!("bad image URL '{url}': {e}")))
    }

    fn file_part(upload: &Upload) -> Result<multipart::Part, ApiError> {
        multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| ApiError::Transport(format!("invalid content type: {e}")))
    }

    fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: multipart::Form,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(endpoint);
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(timeout)
            .send()
            .map_err(transport)?;
        decode(check_status(response)?)
    }
}

impl CompositionService for HttpClient {
    fn analyze(&self, upload: &Upload, genre: Genre) -> Result<CompositionAnalysis, ApiError> {
        info!("Uploading {} ({} bytes) as {genre}", upload.file_name, upload.len());
        let form = multipart::Form::new()
            .part("file", Self::file_part(upload)?)
            .text("genre", genre.as_str());

        let analysis: CompositionAnalysis =
            self.post_form(ANALYZE_ENDPOINT, form, self.config.timeout)?;
        analysis
            .validate()
            .map_err(|e| ApiError::Protocol(e.to_string()))?;
        Ok(analysis)
    }

    fn generate(
        &self,
        upload: &Upload,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ApiError> {
        info!(
            "Requesting generation for {} (style {}, strength {})",
            upload.file_name, request.style, request.strength
        );
        let form = multipart::Form::new()
            .part("file", Self::file_part(upload)?)
            .text("prompt", request.prompt.clone())
            .text("style", request.style.as_str())
            .text("strength", request.strength.to_string());

        self.post_form(GENERATE_ENDPOINT, form, self.config.generation_timeout)
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = join_root(&self.config.base_url, "/health");
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .map_err(transport)?;
        decode(check_status(response)?)
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.resolve(url)?;
        info!("Downloading {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .map_err(transport)?;
        let bytes = check_status(response)?.bytes().map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

fn join_root(base: &str, path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return base.trim_end_matches('/').to_string();
    }
    let sep = if path.starts_with('/') { "" } else { "/" };
    format!("{}{sep}{path}", base.trim_end_matches('/'))
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport(format!("timed out: {e}"))
    } else {
        ApiError::Transport(e.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ApiError::Server {
        status: status.as_u16(),
        detail: parse_detail(&body),
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().map_err(transport)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the `detail` of an error body.
///
/// Plain strings are returned as-is; structured details (validation error
/// lists) are returned as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
