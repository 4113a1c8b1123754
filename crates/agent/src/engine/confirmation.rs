//! Confirmation and OTP turns

use voice_banking_core::{format_inr, BankingAction, CardAction};
use voice_banking_text_processing::EntityExtractor;

use super::DialogueTurn;
use crate::session::{DialogueSession, DialogueState, PendingAction};

const AFFIRMATIVE_WORDS: [&str; 4] = ["yes", "confirm", "proceed", "ok"];

const OTP_PROMPT: &str =
    "Please provide the OTP sent to your registered mobile number to complete the transfer.";
const OTP_REPROMPT: &str = "Please provide the 6-digit OTP.";
const CANCELLED: &str = "Transaction cancelled.";
const CONFIRM_OR_CANCEL: &str = "Please say 'yes' to confirm or 'no' to cancel.";

fn is_affirmative(text: &str) -> bool {
    let lower = text.to_lowercase();
    AFFIRMATIVE_WORDS.iter().any(|w| lower.contains(w))
}

/// Answer to an outstanding confirmation. Anything not affirmative cancels.
pub(super) fn handle_confirmation(
    session: &mut DialogueSession,
    text: &str,
) -> (&'static str, DialogueTurn) {
    let DialogueState::AwaitingConfirmation { action, entities } = session.state().clone() else {
        return ("error", DialogueTurn::reply(CANCELLED));
    };
    let label = action.intent().as_str();

    if !is_affirmative(text) {
        session.clear_pending();
        tracing::debug!(session_id = %session.id(), %action, "Pending action cancelled");
        return (label, DialogueTurn::reply(CANCELLED));
    }

    let turn = match action {
        PendingAction::TransferFunds => {
            session.set_state(DialogueState::AwaitingOtp { entities });
            DialogueTurn::with_action(
                OTP_PROMPT,
                BankingAction::PendingTransfer { requires_otp: true },
            )
        }
        PendingAction::BlockCard => {
            let card_type = entities.card_type.unwrap_or_default();
            session.clear_pending();
            DialogueTurn::with_action(
                format!("Your {} card has been blocked.", card_type),
                BankingAction::ManageCard {
                    card_action: CardAction::Block,
                    card_type,
                    limit: None,
                },
            )
        }
        // only transfers and card blocks are ever parked for confirmation
        PendingAction::SetupAutoPay | PendingAction::SetCardLimit => {
            DialogueTurn::reply(CONFIRM_OR_CANCEL)
        }
    };

    (label, turn)
}

/// Answer to an outstanding OTP challenge
pub(super) fn handle_otp(
    extractor: &EntityExtractor,
    session: &mut DialogueSession,
    text: &str,
) -> (&'static str, DialogueTurn) {
    let label = PendingAction::TransferFunds.intent().as_str();

    let Some(otp) = extractor.extract_otp(text) else {
        return (label, DialogueTurn::reply(OTP_REPROMPT));
    };

    let entities = session.pending_entities().cloned().unwrap_or_default();
    let amount = entities.amount.unwrap_or(0.0);
    let recipient_name = entities.recipient_name.unwrap_or_default();
    session.clear_pending();

    let turn = DialogueTurn::with_action(
        format!(
            "Processing transfer of {} to {}...",
            format_inr(amount),
            recipient_name
        ),
        BankingAction::TransferFunds {
            otp,
            amount,
            recipient_name,
        },
    );
    (label, turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_banking_core::Entities;

    #[test]
    fn test_affirmative_words() {
        assert!(is_affirmative("Yes please"));
        assert!(is_affirmative("ok go ahead"));
        assert!(is_affirmative("please proceed"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("wait"));
    }

    #[test]
    fn test_confirmed_block_defaults_to_debit() {
        let mut session = DialogueSession::new("s1", "u1");
        session.set_state(DialogueState::AwaitingConfirmation {
            action: PendingAction::BlockCard,
            entities: Entities {
                card_action: Some(CardAction::Block),
                ..Default::default()
            },
        });

        let (label, turn) = handle_confirmation(&mut session, "yes");
        assert_eq!(label, "manage_card");
        assert_eq!(turn.response, "Your debit card has been blocked.");
        assert_eq!(
            turn.action.and_then(|a| a.action_name()),
            Some("manage_card")
        );
        assert_eq!(session.state(), &DialogueState::Idle);
    }

    #[test]
    fn test_unexpected_parked_action_reprompts() {
        let mut session = DialogueSession::new("s1", "u1");
        let state = DialogueState::AwaitingConfirmation {
            action: PendingAction::SetupAutoPay,
            entities: Entities::default(),
        };
        session.set_state(state.clone());

        let (_, turn) = handle_confirmation(&mut session, "yes");
        assert_eq!(turn.response, CONFIRM_OR_CANCEL);
        assert_eq!(session.state(), &state);
    }

    #[test]
    fn test_otp_with_missing_details() {
        let mut session = DialogueSession::new("s1", "u1");
        session.set_state(DialogueState::AwaitingOtp {
            entities: Entities::default(),
        });

        let (_, turn) = handle_otp(&EntityExtractor::new(), &mut session, "it is 4321");
        assert_eq!(turn.response, "Processing transfer of ₹0.00 to ...");
        assert!(!session.requires_otp());
    }
}
