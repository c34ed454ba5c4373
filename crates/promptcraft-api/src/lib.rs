//! # promptcraft-api
//!
//! HTTP surface for promptcraft: the upload page, prompt generation
//! endpoints and per-session flow state.

pub mod handlers;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use promptcraft_inference::PromptGenerator;

pub use services::{SessionObserver, SessionRegistry};

/// Default request body limit: a base64-encoded maximum-size image plus the
/// JSON envelope.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 28 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PromptGenerator>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(generator: PromptGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
            sessions: SessionRegistry::new(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced as HTTP status codes.
///
/// Authentication and generation failures are not in here: they are normal
/// outcomes reported with a 200 and the `failed` flow state.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<promptcraft_core::Error> for ApiError {
    fn from(err: promptcraft_core::Error) -> Self {
        match err {
            promptcraft_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with tracing, request ids and body limits.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::page::index))
        .route("/health", get(handlers::page::health_check))
        .route("/api/v1/prompts", post(handlers::prompts::generate_prompt))
        .route(
            "/api/v1/prompts/upload",
            post(handlers::prompts::generate_prompt_upload),
        )
        .route("/api/v1/sessions/:id", get(handlers::prompts::get_session))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}
