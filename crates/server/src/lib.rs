//! Voice Banking Server
//!
//! HTTP and WebSocket transport for the banking assistant, plus the
//! in-memory ledger that stands in for the bank's core systems.

pub mod executor;
pub mod http;
pub mod ledger;
pub mod metrics;
pub mod state;
pub mod websocket;

pub use executor::{ActionExecutor, ActionResult, TurnOutcome};
pub use http::create_router;
pub use ledger::InMemoryLedger;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;
pub use websocket::WebSocketHandler;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use voice_banking_agent::AgentError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Service at capacity: {0}")]
    Capacity(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Capacity(_) => ServerError::Capacity(err.to_string()),
            AgentError::SessionClosed(_) | AgentError::SessionOwner { .. } => {
                ServerError::Session(err.to_string())
            }
            AgentError::Core(voice_banking_core::Error::AccountNotFound(user)) => {
                ServerError::NotFound(format!("account for user {}", user))
            }
            AgentError::Core(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Session(_) => StatusCode::CONFLICT,
            ServerError::Capacity(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        if matches!(self, ServerError::Internal(_)) {
            tracing::error!(error = %message, "Request failed");
        }
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_mapping() {
        let capacity: ServerError = AgentError::Capacity(10).into();
        assert_eq!(StatusCode::from(capacity), StatusCode::SERVICE_UNAVAILABLE);

        let owner: ServerError = AgentError::SessionOwner {
            session_id: "s1".to_string(),
        }
        .into();
        assert_eq!(StatusCode::from(owner), StatusCode::CONFLICT);

        let missing: ServerError =
            AgentError::Core(voice_banking_core::Error::AccountNotFound("ghost".to_string()))
                .into();
        assert_eq!(missing.to_string(), "Not found: account for user ghost");
    }
}
