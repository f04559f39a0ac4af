//! HTTP API server for the tutoring gateway
//!
//! Thin presentation seam over the core: the turn controller does the work,
//! these handlers move bytes and JSON. Single-session service; one
//! `RwLock<Session>` serializes the only writer.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AccentRegion, ProficiencyLevel, TeachingStyle, TutorConfig};
use crate::controller::{TurnController, TurnOutcome, TurnPhase};
use crate::session::Session;
use crate::voice::SpeechSynthesizer;
use crate::{Error, Result};

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<RwLock<Session>>,
    pub tutor: Arc<RwLock<TutorConfig>>,
    pub controller: Arc<TurnController>,
    /// Standalone synthesis endpoint; `None` when voice output is disabled
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Response for a completed (or empty) turn
#[derive(Serialize)]
pub struct TurnResponse {
    /// True when no speech was detected; all other fields are empty
    pub no_speech: bool,
    pub transcript: String,
    pub reply: String,
    pub records_added: usize,
    /// Base64-encoded MP3 reply audio, absent in text-only degradation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::NoSpeech => Self {
                no_speech: true,
                transcript: String::new(),
                reply: String::new(),
                records_added: 0,
                audio_base64: None,
            },
            TurnOutcome::Reply {
                transcript,
                reply,
                records_added,
                audio,
            } => Self {
                no_speech: false,
                transcript,
                reply,
                records_added,
                audio_base64: audio
                    .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
            },
        }
    }
}

/// Run one voice turn from raw audio bytes
async fn audio_turn(
    State(state): State<ApiState>,
    body: Bytes,
) -> std::result::Result<Json<TurnResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty audio data"));
    }

    let config = state.tutor.read().await.clone();
    let mut session = state.session.write().await;
    let outcome = state
        .controller
        .run_audio_turn(&mut session, &config, &body)
        .await?;

    Ok(Json(outcome.into()))
}

/// Text turn request
#[derive(Deserialize)]
struct TextTurnRequest {
    text: String,
}

/// Run one turn from already-transcribed text
async fn text_turn(
    State(state): State<ApiState>,
    Json(request): Json<TextTurnRequest>,
) -> std::result::Result<Json<TurnResponse>, ApiError> {
    let config = state.tutor.read().await.clone();
    let mut session = state.session.write().await;
    let outcome = state
        .controller
        .run_text_turn(&mut session, &config, &request.text)
        .await?;

    Ok(Json(outcome.into()))
}

/// Session export response
#[derive(Serialize)]
struct SessionResponse {
    phase: &'static str,
    turns: Vec<serde_json::Value>,
}

/// Export the full transcript
async fn get_session(State(state): State<ApiState>) -> Json<SessionResponse> {
    let session = state.session.read().await;
    let phase = match TurnController::phase(&session) {
        TurnPhase::Idle => "idle",
        TurnPhase::AwaitingModelReply => "awaiting_model_reply",
    };
    Json(SessionResponse {
        phase,
        turns: session.export(),
    })
}

/// Clear the transcript; progress survives
async fn reset_session(State(state): State<ApiState>) -> StatusCode {
    state.session.write().await.reset();
    StatusCode::NO_CONTENT
}

/// Learning progress
async fn get_progress(
    State(state): State<ApiState>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let session = state.session.read().await;
    let progress = serde_json::to_value(&session.progress).map_err(Error::from)?;
    Ok(Json(progress))
}

/// Current tutor settings
async fn get_settings(State(state): State<ApiState>) -> Json<TutorConfig> {
    Json(state.tutor.read().await.clone())
}

/// Partial tutor settings update, applied between turns
#[derive(Deserialize)]
struct SettingsUpdate {
    style: Option<TeachingStyle>,
    level: Option<ProficiencyLevel>,
    accent: Option<AccentRegion>,
    model: Option<String>,
    history_window: Option<usize>,
}

/// Update tutor settings; the next turn uses the new values
async fn put_settings(
    State(state): State<ApiState>,
    Json(update): Json<SettingsUpdate>,
) -> Json<TutorConfig> {
    let mut tutor = state.tutor.write().await;
    if let Some(style) = update.style {
        tutor.style = style;
    }
    if let Some(level) = update.level {
        tutor.level = level;
    }
    if let Some(accent) = update.accent {
        tutor.accent = accent;
    }
    if let Some(model) = update.model {
        tutor.model = model;
    }
    if let Some(window) = update.history_window {
        tutor.history_window = window;
    }
    tracing::info!(style = %tutor.style, level = %tutor.level, "settings updated");
    Json(tutor.clone())
}

/// Synthesis request
#[derive(Deserialize)]
struct SynthesizeRequest {
    text: String,
}

/// Standalone text-to-speech, returns MP3 bytes
async fn synthesize(
    State(state): State<ApiState>,
    Json(request): Json<SynthesizeRequest>,
) -> std::result::Result<Response, ApiError> {
    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or(ApiError::NotConfigured("voice output disabled"))?;

    if request.text.is_empty() {
        return Err(ApiError::BadRequest("empty text"));
    }

    let accent = state.tutor.read().await.accent;
    let audio = synthesizer.synthesize(&request.text, accent).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        audio,
    )
        .into_response())
}

/// Build the API router
#[must_use]
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/turn", post(audio_turn))
        .route("/api/turn/text", post(text_turn))
        .route("/api/session", get(get_session))
        .route("/api/session/reset", post(reset_session))
        .route("/api/progress", get(get_progress))
        .route("/api/settings", get(get_settings))
        .route("/api/settings", put(put_settings))
        .route("/api/synthesize", post(synthesize))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on the given port until shutdown
///
/// # Errors
///
/// Returns error if the listener cannot bind
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// API error mapped onto HTTP status codes
#[derive(Debug)]
enum ApiError {
    BadRequest(&'static str),
    NotConfigured(&'static str),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            Self::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.to_string()),
            Self::Internal(e) => {
                let status = match &e {
                    Error::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
