//! WebSocket Handler
//!
//! Text conversation over a socket bound to one dialogue session.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use voice_banking_agent::{AssistantReply, SessionHandle};
use voice_banking_core::Alert;

use crate::executor::{ActionResult, TurnOutcome};
use crate::state::AppState;
use crate::ServerError;

/// Messages accepted from the client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Text { text: String },
    Ping,
}

/// Messages pushed to the client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Response(AssistantReply),
    FraudAlert {
        alerts: Vec<Alert>,
        #[serde(rename = "requiresConfirmation")]
        requires_confirmation: bool,
    },
    ActionResult(ActionResult),
    Error {
        message: String,
    },
    Pong,
}

impl ServerMessage {
    /// Split a finished turn into the messages a client sees, in order
    pub fn from_outcome(outcome: TurnOutcome) -> Vec<ServerMessage> {
        let TurnOutcome {
            reply,
            alerts,
            action_result,
        } = outcome;

        let mut messages = vec![ServerMessage::Response(reply)];
        if !alerts.is_empty() {
            messages.push(ServerMessage::FraudAlert {
                alerts,
                requires_confirmation: true,
            });
        }
        if let Some(result) = action_result {
            messages.push(ServerMessage::ActionResult(result));
        }
        messages
    }
}

type WsSender = SplitSink<WebSocket, Message>;

/// WebSocket handler
pub struct WebSocketHandler;

impl WebSocketHandler {
    /// Handle WebSocket upgrade
    pub async fn handle(
        ws: WebSocketUpgrade,
        State(state): State<AppState>,
        Path(session_id): Path<String>,
        user_id: String,
    ) -> Result<Response, ServerError> {
        let handle = state.sessions.attach(&user_id, Some(session_id.as_str()))?;
        Ok(ws.on_upgrade(move |socket| Self::handle_socket(socket, handle, state)))
    }

    /// Handle WebSocket connection
    async fn handle_socket(socket: WebSocket, handle: Arc<SessionHandle>, state: AppState) {
        let (mut sender, mut receiver) = socket.split();

        tracing::info!(session_id = %handle.id, user_id = %handle.user_id, "WebSocket connected");

        let connected = ServerMessage::Connected {
            session_id: handle.id.clone(),
        };
        if !Self::send(&mut sender, &connected).await {
            state.sessions.detach(&handle);
            return;
        }

        while let Some(msg) = receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(session_id = %handle.id, error = %e, "WebSocket receive error");
                    break;
                }
            };

            let replies = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => vec![ServerMessage::Pong],
                Ok(ClientMessage::Text { text }) if text.trim().is_empty() => {
                    vec![ServerMessage::Error {
                        message: "text is required".to_string(),
                    }]
                }
                Ok(ClientMessage::Text { text }) => {
                    match state.process_turn(&handle, text.trim()).await {
                        Ok(outcome) => ServerMessage::from_outcome(outcome),
                        Err(e) => vec![ServerMessage::Error {
                            message: e.to_string(),
                        }],
                    }
                }
                Err(e) => {
                    tracing::debug!(session_id = %handle.id, error = %e, "Unrecognised client message");
                    vec![ServerMessage::Error {
                        message: format!("invalid message: {}", e),
                    }]
                }
            };

            let mut delivered = true;
            for reply in &replies {
                if !Self::send(&mut sender, reply).await {
                    delivered = false;
                    break;
                }
            }
            if !delivered {
                break;
            }
        }

        state.sessions.detach(&handle);
        tracing::info!(session_id = %handle.id, "WebSocket disconnected");
    }

    async fn send(sender: &mut WsSender, message: &ServerMessage) -> bool {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize WebSocket message");
                return true;
            }
        };

        match sender.send(Message::Text(json)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket send failed");
                false
            }
        }
    }
}
