//! Prompt generation HTTP handlers.
//!
//! Every request selects a new image for its session, which supersedes any
//! attempt still running for that session. The response reports whether the
//! attempt was superseded while it ran (`stale`), in which case clients must
//! discard it.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use promptcraft_core::{AttemptToken, FlowState, FlowTracker, ImagePayload};

use crate::{ApiError, AppState};

/// Request body for generating a prompt from a base64 image.
#[derive(Debug, Deserialize)]
pub struct GeneratePromptRequest {
    /// Base64 image bytes, optionally as a `data:` URL.
    pub image_data: String,
    /// Declared MIME type. Detected from the bytes when possible.
    pub mime_type: Option<String>,
    /// Session returned by a previous call. A new session is created when
    /// missing or unknown.
    pub session_id: Option<String>,
}

/// Result of one attempt.
///
/// `state` is `success` with a `prompt`, or `failed` with a `message`.
#[derive(Debug, Serialize)]
pub struct GeneratePromptResponse {
    pub session_id: String,
    pub attempt_token: AttemptToken,
    #[serde(flatten)]
    pub state: FlowState,
    /// Calls made to the generation endpoint.
    pub attempts: u32,
    /// A newer image was selected for this session while this attempt ran.
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub tracker: FlowTracker,
}

/// Generate a prompt from a base64-encoded image.
///
/// # Returns
/// - 200 OK with the final flow state (auth and generation failures included)
/// - 400 Bad Request for invalid base64, empty or non-image data
pub async fn generate_prompt(
    State(state): State<AppState>,
    Json(req): Json<GeneratePromptRequest>,
) -> Result<Json<GeneratePromptResponse>, ApiError> {
    let image = ImagePayload::from_base64(&req.image_data, req.mime_type.as_deref())?;
    Ok(Json(run_attempt(&state, image, req.session_id.as_deref()).await))
}

/// Generate a prompt from a multipart upload (`file`, optional `session_id`).
pub async fn generate_prompt_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GeneratePromptResponse>, ApiError> {
    let mut image = None;
    let mut session_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                image = Some(ImagePayload::from_bytes(&bytes, declared.as_deref())?);
            }
            Some("session_id") => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read session_id: {}", e))
                })?;
                session_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".into()))?;
    Ok(Json(run_attempt(&state, image, session_id.as_deref()).await))
}

/// Current flow state of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let tracker = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))?;
    Ok(Json(SessionResponse {
        session_id: id,
        tracker,
    }))
}

#[instrument(skip_all, fields(
    subsystem = "api",
    op = "generate_prompt",
    session_id = tracing::field::Empty,
))]
async fn run_attempt(
    state: &AppState,
    image: ImagePayload,
    session_id: Option<&str>,
) -> GeneratePromptResponse {
    let (session_id, token) = state.sessions.select_image(session_id);
    tracing::Span::current().record("session_id", session_id.as_str());

    let observer = state.sessions.observer(&session_id, token);
    let outcome = state.generator.generate_observed(image, &observer).await;
    let stale = !state.sessions.is_current(&session_id, token);

    info!(
        attempt_token = token.sequence(),
        success = outcome.is_success(),
        attempts = outcome.attempts(),
        stale,
        "Prompt attempt finished"
    );

    GeneratePromptResponse {
        session_id,
        attempt_token: token,
        state: outcome.to_flow_state(),
        attempts: outcome.attempts(),
        stale,
    }
}
