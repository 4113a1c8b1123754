//! Clarifying replies and correction suggestions

use voice_banking_core::ClarificationKind;
use voice_banking_text_processing::similarity::{closest_match, DEFAULT_CUTOFF};

const EXAMPLE_COMMANDS: &str = " You can ask me to: check balance, transfer money, view transactions, spending summary, or inquire about loans.";

/// Guidance text for a clarification kind
pub fn clarification_message(kind: ClarificationKind) -> String {
    let base = match kind {
        ClarificationKind::InsufficientInfo => {
            "I need a bit more information. Could you please provide more details?"
        }
        ClarificationKind::InvalidAmount => {
            "I didn't understand the amount. Please say the amount clearly, for example: 'five thousand rupees' or '₹5000'"
        }
        ClarificationKind::InvalidRecipient => {
            "I couldn't find that recipient. Did you mean one of your saved beneficiaries?"
        }
        ClarificationKind::InvalidCommand => {
            "I'm not sure I understand. Could you try rephrasing? For example: 'Transfer money' or 'Check balance'"
        }
        ClarificationKind::NetworkError => {
            "I'm having trouble connecting. Please try again in a moment."
        }
        ClarificationKind::Timeout => "The request is taking too long. Please try again.",
        ClarificationKind::Unknown => "Something went wrong. Please try again.",
    };

    let mut message = base.to_string();
    if kind == ClarificationKind::InvalidCommand {
        message.push_str(EXAMPLE_COMMANDS);
    }
    message
}

/// Closest valid option to what the caller said, if any is close enough
pub fn suggest_correction<'a, S: AsRef<str>>(text: &str, options: &'a [S]) -> Option<&'a str> {
    closest_match(text, options, DEFAULT_CUTOFF)
}
