//! Dialogue engine
//!
//! Every utterance is routed in strict priority order:
//! 1. an outstanding confirmation
//! 2. an outstanding OTP challenge
//! 3. a parked slot-filling action the utterance can complete
//! 4. the classified intent
//!
//! The engine only decides what to say and which action to request. It
//! never moves money or queries spending; the transport executes the
//! returned [`ActionDescriptor`].

mod confirmation;
mod handlers;

use serde::Serialize;

use voice_banking_core::{
    ActionDescriptor, CardAction, Clarification, ClarificationKind, Entities, Intent,
    IntentResult,
};
use voice_banking_text_processing::EntityExtractor;

use crate::clarification::clarification_message;
use crate::session::{DialogueSession, DialogueState, PendingAction};

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTurn {
    pub response: String,
    pub action: Option<ActionDescriptor>,
}

impl DialogueTurn {
    pub fn reply(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            action: None,
        }
    }

    pub fn with_action(response: impl Into<String>, action: impl Into<ActionDescriptor>) -> Self {
        Self {
            response: response.into(),
            action: Some(action.into()),
        }
    }
}

/// Which handler an utterance goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Confirmation,
    Otp,
    /// Completes the parked slot-filling action
    Resume(PendingAction),
    Dispatch(Intent),
}

impl Route {
    /// Whether the handler reads the account balance
    pub fn needs_balance(&self) -> bool {
        match self {
            Route::Resume(action) => *action == PendingAction::TransferFunds,
            Route::Dispatch(intent) => {
                matches!(intent, Intent::CheckBalance | Intent::TransferFunds)
            }
            Route::Confirmation | Route::Otp => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    extractor: EntityExtractor,
}

impl DialogueEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, session: &DialogueSession, classified: &IntentResult) -> Route {
        match session.state() {
            DialogueState::AwaitingConfirmation { .. } => Route::Confirmation,
            DialogueState::AwaitingOtp { .. } => Route::Otp,
            DialogueState::SlotFilling { action, .. }
                if classified.intent == Intent::Other || classified.intent == action.intent() =>
            {
                Route::Resume(*action)
            }
            _ => Route::Dispatch(classified.intent),
        }
    }

    /// Advance the session by one utterance
    pub fn process(
        &self,
        session: &mut DialogueSession,
        text: &str,
        classified: &IntentResult,
        balance: f64,
    ) -> DialogueTurn {
        let route = self.route(session, classified);
        tracing::debug!(
            session_id = %session.id(),
            intent = %classified.intent,
            ?route,
            "Routing utterance"
        );

        let (label, turn) = match route {
            Route::Confirmation => confirmation::handle_confirmation(session, text),
            Route::Otp => confirmation::handle_otp(&self.extractor, session, text),
            Route::Resume(action) => {
                let entities = self.resume_entities(session, action, text, classified.intent);
                session.clear_pending();
                let turn = self.run_action(session, action, entities, balance);
                (action.intent().as_str(), turn)
            }
            Route::Dispatch(intent) => {
                // a different request abandons any parked slot; a greeting does not
                if intent != Intent::Greeting {
                    session.clear_pending();
                }
                match handlers::dispatch(session, intent, classified.entities.clone(), balance) {
                    Some(turn) => (intent.as_str(), turn),
                    None => return self.clarify(session, text, ClarificationKind::InvalidCommand),
                }
            }
        };

        session.record(text, label, &turn.response);
        turn
    }

    /// Reply with guidance instead of acting; recorded as `error`
    pub fn clarify(
        &self,
        session: &mut DialogueSession,
        text: &str,
        kind: ClarificationKind,
    ) -> DialogueTurn {
        let turn = DialogueTurn::with_action(clarification_message(kind), Clarification::new(kind));
        session.record(text, "error", &turn.response);
        turn
    }

    /// Parked entities updated with whatever this answer supplies
    ///
    /// A bare capitalised name only counts as the recipient when the answer
    /// did not classify as a request of its own ("Pay Akash").
    fn resume_entities(
        &self,
        session: &DialogueSession,
        action: PendingAction,
        text: &str,
        answered_as: Intent,
    ) -> Entities {
        let mut merged = session.pending_entities().cloned().unwrap_or_default();
        let mut fresh = self.extractor.extract(text, action.intent());

        match action {
            PendingAction::TransferFunds => {
                if missing_amount(merged.amount) && missing_amount(fresh.amount) {
                    fresh.amount = self.extractor.extract_bare_amount(text);
                }
                if merged.recipient_name.is_none()
                    && fresh.recipient_name.is_none()
                    && answered_as == Intent::Other
                {
                    fresh.recipient_name = self.extractor.extract_bare_name(text);
                }
            }
            PendingAction::SetCardLimit => {
                fresh.card_action = None;
                if missing_amount(fresh.limit) {
                    fresh.limit = fresh
                        .amount
                        .filter(|a| *a > 0.0)
                        .or_else(|| self.extractor.extract_bare_amount(text));
                }
            }
            PendingAction::SetupAutoPay | PendingAction::BlockCard => {}
        }

        merged.merge(fresh);
        merged
    }

    fn run_action(
        &self,
        session: &mut DialogueSession,
        action: PendingAction,
        mut entities: Entities,
        balance: f64,
    ) -> DialogueTurn {
        match action {
            PendingAction::TransferFunds => handlers::transfer_funds(session, entities, balance),
            PendingAction::SetupAutoPay => handlers::setup_auto_pay(session, entities),
            PendingAction::SetCardLimit => {
                entities.card_action = Some(CardAction::SetLimit);
                handlers::manage_card(session, entities)
            }
            PendingAction::BlockCard => {
                entities.card_action = Some(CardAction::Block);
                handlers::manage_card(session, entities)
            }
        }
    }
}

/// Zero and negative figures count as unanswered
fn missing_amount(amount: Option<f64>) -> bool {
    amount.filter(|a| *a > 0.0).is_none()
}

#[cfg(test)]
mod tests;
