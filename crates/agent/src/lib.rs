//! Multi-turn banking dialogue
//!
//! Features:
//! - Per-session state machine (slot filling, confirmation, OTP)
//! - Clarifying replies and correction suggestions
//! - Session registry with capacity and idle expiry
//! - `BankingAssistant` composing classifier, engine and account store

pub mod assistant;
pub mod clarification;
pub mod engine;
pub mod registry;
pub mod session;

pub use assistant::{AssistantReply, BankingAssistant};
pub use clarification::{clarification_message, suggest_correction};
pub use engine::{DialogueEngine, DialogueTurn, Route};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{DialogueSession, DialogueState, HistoryEntry, PendingAction, SessionSnapshot};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Max sessions reached ({0})")]
    Capacity(usize),

    #[error("Session closed: {0}")]
    SessionClosed(String),

    #[error("Session {session_id} belongs to another user")]
    SessionOwner { session_id: String },

    #[error(transparent)]
    Core(#[from] voice_banking_core::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
