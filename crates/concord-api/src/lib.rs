//! # concord-api
//!
//! HTTP surface for concord: project and document management, `.docx`
//! ingestion, and pairwise consistency checks delegated to the Analysis
//! Engine.
//!
//! The router is built from trait objects so the binary wires PostgreSQL and
//! the HTTP engine client while tests wire in-memory fakes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Method, Request},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use concord_core::{AnalysisEngine, DocumentStore, ParagraphExtractor};

pub use config::ServerConfig;
pub use error::ApiError;
pub use services::{ConsistencyService, IngestionService};

/// Headroom for multipart framing on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub ingestion: IngestionService,
    pub consistency: ConsistencyService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn ParagraphExtractor>,
        engine: Arc<dyn AnalysisEngine>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            ingestion: IngestionService::new(
                Arc::clone(&store),
                extractor,
                Arc::clone(&engine),
            ),
            consistency: ConsistencyService::new(Arc::clone(&store), engine),
            store,
            max_upload_bytes,
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router with its middleware stack.
/// Bind the configured host and port, resolving host names such as
/// `localhost`.
pub async fn bind_listener(config: &ServerConfig) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await
}

pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let upload_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/projects/:id/documents",
            get(handlers::projects::list_documents)
                .post(handlers::documents::upload_document)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/projects/:id/consistency/run",
            post(handlers::consistency::run_consistency),
        )
        .route(
            "/projects/:id/inconsistencies",
            get(handlers::consistency::list_inconsistencies),
        )
        .route(
            "/documents/:id/content",
            get(handlers::documents::get_document_content),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(state)
}
