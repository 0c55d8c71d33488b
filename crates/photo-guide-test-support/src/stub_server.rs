//! In-process stand-in for the composition backend.
//!
//! Serves the two POST endpoints, the health check and `/outputs/*` on an
//! ephemeral localhost port. Replies are canned; every request is recorded
//! with its multipart fields so tests can assert on what the client sent.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::builders::{AnalysisBuilder, GenerationBuilder, SyntheticUpload};

/// Path of the analysis endpoint.
pub const ANALYZE_PATH: &str = "/api/v1/analyze-composition";
/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/v1/generate-nanobanana";

/// A canned HTTP reply.
#[derive(Debug, Clone)]
pub struct StubReply {
    status: u16,
    body: String,
    content_type: &'static str,
}

impl StubReply {
    /// JSON reply with the given status.
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
        }
    }

    /// Plain-text reply with the given status.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: "text/plain",
        }
    }

    /// FastAPI-style error: `{"detail": "..."}`.
    #[must_use]
    pub fn detail(status: u16, detail: &str) -> Self {
        Self::json(status, &serde_json::json!({ "detail": detail }))
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// One multipart field as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedField {
    /// File name attached to the part, if any.
    pub file_name: Option<String>,
    /// Content type attached to the part, if any.
    pub content_type: Option<String>,
    /// Raw part body.
    pub data: Vec<u8>,
}

impl RecordedField {
    /// Part body as UTF-8 text (lossy).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// One request as received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request path.
    pub path: String,
    /// Multipart fields by name; empty for GET requests.
    pub fields: BTreeMap<String, RecordedField>,
}

impl RecordedRequest {
    /// Text value of a form field.
    #[must_use]
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(RecordedField::text)
    }
}

struct StubState {
    analyze: Mutex<StubReply>,
    generate: Mutex<StubReply>,
    image: Mutex<Vec<u8>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A running stub backend. Stops when dropped.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl StubBackend {
    /// Starts the stub with default replies: a valid analysis and a
    /// successful generation pointing at `/outputs/stub_output.png`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub fn start() -> anyhow::Result<Self> {
        let state = Arc::new(StubState {
            analyze: Mutex::new(StubReply::json(200, &AnalysisBuilder::new().to_json())),
            generate: Mutex::new(StubReply::json(
                200,
                &GenerationBuilder::image("/outputs/stub_output.png").to_json(),
            )),
            image: Mutex::new(SyntheticUpload::encode(4, 4, image::ImageFormat::Png)),
            requests: Mutex::new(Vec::new()),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route(ANALYZE_PATH, post(analyze))
            .route(GENERATE_PATH, post(generate))
            .route("/health", get(health))
            .route("/outputs/:name", get(output))
            .with_state(Arc::clone(&state));

        let (tx, rx) = oneshot::channel::<()>();
        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("Stub backend runtime failed to start: {e}");
                    return;
                }
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        warn!("Stub backend listener failed: {e}");
                        return;
                    }
                };
                let shutdown = async {
                    let _ = rx.await;
                };
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    warn!("Stub backend stopped with error: {e}");
                }
            });
        });

        debug!("Stub backend listening on {addr}");
        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
            thread: Some(thread),
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:49152`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replaces the analysis reply.
    pub fn set_analyze_reply(&self, reply: StubReply) {
        *self
            .state
            .analyze
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reply;
    }

    /// Replaces the generation reply.
    pub fn set_generate_reply(&self, reply: StubReply) {
        *self
            .state
            .generate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reply;
    }

    /// Replaces the bytes served under `/outputs/*`.
    pub fn set_image(&self, bytes: Vec<u8>) {
        *self
            .state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = bytes;
    }

    /// The bytes currently served under `/outputs/*`.
    #[must_use]
    pub fn image(&self) -> Vec<u8> {
        self.state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received on `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn analyze(State(state): State<Arc<StubState>>, multipart: Multipart) -> Response {
    record_form(&state, ANALYZE_PATH, multipart).await;
    current(&state.analyze).into_response()
}

async fn generate(State(state): State<Arc<StubState>>, multipart: Multipart) -> Response {
    record_form(&state, GENERATE_PATH, multipart).await;
    current(&state.generate).into_response()
}

async fn health(State(state): State<Arc<StubState>>) -> Response {
    record(&state, "/health".into(), BTreeMap::new());
    Json(serde_json::json!({ "status": "healthy", "service": "Photo Guide API" })).into_response()
}

async fn output(State(state): State<Arc<StubState>>, Path(name): Path<String>) -> Response {
    record(&state, format!("/outputs/{name}"), BTreeMap::new());
    let bytes = state
        .image
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

async fn record_form(state: &StubState, path: &str, mut multipart: Multipart) {
    let mut fields = BTreeMap::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = match field.bytes().await {
                    Ok(b) => b.to_vec(),
                    Err(e) => {
                        warn!("Stub backend failed to read field {name}: {e}");
                        Vec::new()
                    }
                };
                fields.insert(
                    name,
                    RecordedField {
                        file_name,
                        content_type,
                        data,
                    },
                );
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Stub backend got malformed multipart: {e}");
                break;
            }
        }
    }
    record(state, path.into(), fields);
}

fn record(state: &StubState, path: String, fields: BTreeMap<String, RecordedField>) {
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest { path, fields });
}

fn current(reply: &Mutex<StubReply>) -> StubReply {
    reply.lock().unwrap_or_else(PoisonError::into_inner).clone()
}
