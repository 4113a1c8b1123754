//! Per-conversation dialogue state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use voice_banking_core::{Entities, Intent};

/// Action parked while the dialogue waits for more input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    TransferFunds,
    SetupAutoPay,
    BlockCard,
    SetCardLimit,
}

impl PendingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingAction::TransferFunds => "transfer_funds",
            PendingAction::SetupAutoPay => "setup_auto_pay",
            PendingAction::BlockCard => "block_card",
            PendingAction::SetCardLimit => "set_card_limit",
        }
    }

    /// Intent whose handler completes this action
    pub fn intent(&self) -> Intent {
        match self {
            PendingAction::TransferFunds => Intent::TransferFunds,
            PendingAction::SetupAutoPay => Intent::SetupAutoPay,
            PendingAction::BlockCard | PendingAction::SetCardLimit => Intent::ManageCard,
        }
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the conversation stands between turns.
///
/// Confirmation and OTP are separate variants, so a session can never
/// wait on both.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    /// Missing slot; the next answer may complete `action`
    SlotFilling {
        action: PendingAction,
        entities: Entities,
    },
    AwaitingConfirmation {
        action: PendingAction,
        entities: Entities,
    },
    /// Confirmed transfer waiting for its one-time password
    AwaitingOtp { entities: Entities },
}

impl DialogueState {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, DialogueState::AwaitingConfirmation { .. })
    }

    pub fn requires_otp(&self) -> bool {
        matches!(self, DialogueState::AwaitingOtp { .. })
    }

    pub fn pending_action(&self) -> Option<PendingAction> {
        match self {
            DialogueState::Idle => None,
            DialogueState::SlotFilling { action, .. }
            | DialogueState::AwaitingConfirmation { action, .. } => Some(*action),
            DialogueState::AwaitingOtp { .. } => Some(PendingAction::TransferFunds),
        }
    }

    pub fn pending_entities(&self) -> Option<&Entities> {
        match self {
            DialogueState::Idle => None,
            DialogueState::SlotFilling { entities, .. }
            | DialogueState::AwaitingConfirmation { entities, .. }
            | DialogueState::AwaitingOtp { entities } => Some(entities),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub utterance: String,
    /// Handled intent, `error` for clarifications
    pub intent: String,
    pub response: String,
}

/// One caller's conversation
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: String,
    user_id: String,
    state: DialogueState,
    /// Free-form scratch space for the transport
    pub context: HashMap<String, serde_json::Value>,
    history: Vec<HistoryEntry>,
}

impl DialogueSession {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            state: DialogueState::Idle,
            context: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn set_state(&mut self, state: DialogueState) {
        self.state = state;
    }

    /// Drop any parked action, confirmation or OTP wait
    pub fn clear_pending(&mut self) {
        self.state = DialogueState::Idle;
    }

    pub fn requires_confirmation(&self) -> bool {
        self.state.requires_confirmation()
    }

    pub fn requires_otp(&self) -> bool {
        self.state.requires_otp()
    }

    pub fn pending_action(&self) -> Option<PendingAction> {
        self.state.pending_action()
    }

    pub fn pending_entities(&self) -> Option<&Entities> {
        self.state.pending_entities()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn record(&mut self, utterance: &str, intent: &str, response: &str) {
        self.history.push(HistoryEntry {
            timestamp: Utc::now(),
            utterance: utterance.to_string(),
            intent: intent.to_string(),
            response: response.to_string(),
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
            pending_action: self.pending_action(),
            pending_entities: self.pending_entities().cloned().unwrap_or_default(),
            requires_confirmation: self.requires_confirmation(),
            requires_otp: self.requires_otp(),
            context: self.context.clone(),
            history: self.history.clone(),
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub user_id: String,
    pub pending_action: Option<PendingAction>,
    pub pending_entities: Entities,
    pub requires_confirmation: bool,
    pub requires_otp: bool,
    pub context: HashMap<String, serde_json::Value>,
    pub history: Vec<HistoryEntry>,
}
