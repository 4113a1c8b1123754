//! HTTP Endpoints
//!
//! REST API for the banking assistant.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use voice_banking_agent::SessionSnapshot;
use voice_banking_core::Alert;

use crate::executor::TurnOutcome;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::websocket::WebSocketHandler;
use crate::ServerError;

const FALLBACK_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.request_timeout_secs);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))

        // Dialogue turn
        .route("/api/voice/process", post(process_voice))

        // Standalone risk check
        .route("/api/fraud/check", post(fraud_check))

        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))

        // WebSocket
        .route("/ws/:session_id", get(ws_handler))

        // Middleware
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer
/// - If no configured origin parses, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled, allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!(origin = FALLBACK_ORIGIN, "No valid CORS origins configured, using fallback");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(FALLBACK_ORIGIN))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    user_id: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Open a session, or fetch the caller's existing one
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionSnapshot>, ServerError> {
    let user_id = required("user_id", &request.user_id)?;
    let handle = state
        .sessions
        .get_or_create(user_id, request.session_id.as_deref())?;

    Ok(Json(handle.snapshot().await))
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ServerError> {
    let handle = state
        .sessions
        .get(&id)
        .ok_or(ServerError::SessionNotFound(id))?;

    Ok(Json(handle.snapshot().await))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

#[derive(Debug, Deserialize)]
struct VoiceRequest {
    user_id: String,
    text: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// One dialogue turn over plain HTTP
async fn process_voice(
    State(state): State<AppState>,
    Json(request): Json<VoiceRequest>,
) -> Result<Json<TurnOutcome>, ServerError> {
    let user_id = required("user_id", &request.user_id)?;
    let text = required("text", &request.text)?;

    let handle = state
        .sessions
        .get_or_create(user_id, request.session_id.as_deref())?;
    let outcome = state.process_turn(&handle, text).await?;

    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct FraudCheckRequest {
    user_id: String,
    amount: f64,
    #[serde(default)]
    recipient: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FraudCheckResponse {
    alerts: Vec<Alert>,
    requires_confirmation: bool,
}

async fn fraud_check(
    State(state): State<AppState>,
    Json(request): Json<FraudCheckRequest>,
) -> Result<Json<FraudCheckResponse>, ServerError> {
    let user_id = required("user_id", &request.user_id)?;
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(ServerError::InvalidRequest(
            "amount must be a positive number".to_string(),
        ));
    }

    let alerts = state
        .scorer()
        .detect_fraud(user_id, request.amount, request.recipient.as_deref())
        .await;

    Ok(Json(FraudCheckResponse {
        requires_confirmation: !alerts.is_empty(),
        alerts,
    }))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.count(),
        "classifier": state.assistant.intents().strategy(),
    }))
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    user_id: String,
}

/// WebSocket handler wrapper
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<WsQuery>,
) -> Result<Response, ServerError> {
    WebSocketHandler::handle(ws, State(state), Path(session_id), query.user_id).await
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ServerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServerError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(trimmed)
}
