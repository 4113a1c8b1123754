use super::*;
use voice_banking_core::{BankingAction, BillType, CardType};
use voice_banking_text_processing::{IntentClassifier, KeywordClassifier};

const BALANCE: f64 = 100_000.0;

struct Harness {
    engine: DialogueEngine,
    classifier: KeywordClassifier,
    session: DialogueSession,
}

impl Harness {
    fn new() -> Self {
        Self {
            engine: DialogueEngine::new(),
            classifier: KeywordClassifier::default(),
            session: DialogueSession::new("s1", "u1"),
        }
    }

    fn say(&mut self, text: &str) -> DialogueTurn {
        let classified = self.classifier.recognize(text);
        self.engine
            .process(&mut self.session, text, &classified, BALANCE)
    }

    /// Turn with a fixed classification, as a statistical model might return
    fn say_as(&mut self, text: &str, intent: Intent) -> DialogueTurn {
        let entities = EntityExtractor::new().extract(text, intent);
        let classified = IntentResult::new(intent, 0.95, entities);
        self.engine
            .process(&mut self.session, text, &classified, BALANCE)
    }
}

#[test]
fn test_transfer_round_trip() {
    let mut h = Harness::new();

    let turn = h.say("transfer ₹5,000 to Akash");
    assert_eq!(
        turn.response,
        "Please confirm: Transfer ₹5,000.00 to Akash. Say 'yes' to confirm or 'no' to cancel."
    );
    assert!(turn.action.is_none());
    assert!(h.session.requires_confirmation());

    let turn = h.say("yes");
    assert_eq!(
        turn.action,
        Some(BankingAction::PendingTransfer { requires_otp: true }.into())
    );
    assert!(h.session.requires_otp());
    assert!(!h.session.requires_confirmation());

    let turn = h.say("123456");
    assert_eq!(turn.response, "Processing transfer of ₹5,000.00 to Akash...");
    assert_eq!(
        turn.action,
        Some(
            BankingAction::TransferFunds {
                otp: "123456".to_string(),
                amount: 5000.0,
                recipient_name: "Akash".to_string(),
            }
            .into()
        )
    );
    assert_eq!(h.session.state(), &DialogueState::Idle);

    let labels: Vec<_> = h.session.history().iter().map(|e| e.intent.as_str()).collect();
    assert_eq!(labels, vec!["transfer_funds"; 3]);
}

#[test]
fn test_confirmation_beats_classified_intent() {
    let mut h = Harness::new();
    h.say("transfer ₹200 to Ravi");

    // classifies as check_balance, but the confirmation is answered first
    let turn = h.say("no, check my balance instead");
    assert_eq!(turn.response, "Transaction cancelled.");
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[test]
fn test_cancel_twice() {
    let mut h = Harness::new();
    h.say("transfer ₹500 to Ravi");

    assert_eq!(h.say("no").response, "Transaction cancelled.");
    let turn = h.say("no");
    assert_eq!(turn.action, Some(Clarification::new(ClarificationKind::InvalidCommand).into()));
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[test]
fn test_otp_reprompt_keeps_waiting() {
    let mut h = Harness::new();
    h.say("transfer ₹500 to Ravi");
    h.say("yes");

    let turn = h.say("I don't have it yet");
    assert_eq!(turn.response, "Please provide the 6-digit OTP.");
    assert!(turn.action.is_none());
    assert!(h.session.requires_otp());

    let turn = h.say("the code is 9876");
    assert_eq!(turn.action.and_then(|a| a.action_name()), Some("transfer_funds"));
}

#[test]
fn test_slot_filling_resumes_transfer() {
    let mut h = Harness::new();

    let turn = h.say("I want to transfer money");
    assert_eq!(turn.response, "How much would you like to transfer?");
    assert_eq!(h.session.pending_action(), Some(PendingAction::TransferFunds));

    let turn = h.say("5000");
    assert_eq!(turn.response, "Who would you like to transfer to?");
    assert_eq!(h.session.pending_entities().and_then(|e| e.amount), Some(5000.0));

    let turn = h.say("Akash");
    assert_eq!(
        turn.response,
        "Please confirm: Transfer ₹5,000.00 to Akash. Say 'yes' to confirm or 'no' to cancel."
    );
    assert!(h.session.requires_confirmation());
}

#[test]
fn test_greeting_keeps_parked_transfer() {
    let mut h = Harness::new();
    h.say("transfer ₹5,000");
    assert_eq!(h.session.pending_action(), Some(PendingAction::TransferFunds));

    let turn = h.say("hello");
    assert!(turn.response.starts_with("Hello!"));
    assert_eq!(h.session.pending_action(), Some(PendingAction::TransferFunds));

    let turn = h.say("Akash");
    assert_eq!(
        turn.response,
        "Please confirm: Transfer ₹5,000.00 to Akash. Say 'yes' to confirm or 'no' to cancel."
    );
}

#[test]
fn test_zero_amount_accepts_bare_answer() {
    let mut h = Harness::new();
    let turn = h.say("transfer ₹0 to Akash");
    assert_eq!(turn.response, "How much would you like to transfer?");

    let turn = h.say("500");
    assert_eq!(
        turn.response,
        "Please confirm: Transfer ₹500.00 to Akash. Say 'yes' to confirm or 'no' to cancel."
    );
}

#[test]
fn test_zero_card_limit_accepts_bare_answer() {
    let mut h = Harness::new();
    let turn = h.say_as("set my card limit to ₹0", Intent::ManageCard);
    assert_eq!(turn.response, "What spending limit would you like to set?");

    let turn = h.say("15000");
    assert_eq!(
        turn.response,
        "Spending limit set to ₹15,000.00 for your debit card."
    );
}

#[test]
fn test_command_word_is_not_a_recipient() {
    let mut h = Harness::new();
    assert_eq!(h.say("transfer ₹500").response, "Who would you like to transfer to?");

    // classifies as a transfer, so the whole utterance is not taken as a name
    let turn = h.say("Pay Akash");
    assert_eq!(turn.response, "Who would you like to transfer to?");
    assert!(h.session.pending_entities().unwrap().recipient_name.is_none());

    let turn = h.say("pay to Akash");
    assert_eq!(
        turn.response,
        "Please confirm: Transfer ₹500.00 to Akash. Say 'yes' to confirm or 'no' to cancel."
    );
}

#[test]
fn test_confirmation_drops_unrelated_entities() {
    let mut h = Harness::new();
    h.say("transfer ₹500 to Akash from account 12345678");

    let parked = h.session.pending_entities().unwrap();
    assert_eq!(parked.amount, Some(500.0));
    assert_eq!(parked.recipient_name.as_deref(), Some("Akash"));
    assert!(parked.account_number.is_none());
}

#[test]
fn test_fraud_alert_intent_is_clarified() {
    let mut h = Harness::new();
    let turn = h.say_as("something looks off", Intent::FraudAlert);
    assert_eq!(turn.action, Some(Clarification::new(ClarificationKind::InvalidCommand).into()));
    assert_eq!(h.session.history().last().map(|e| e.intent.as_str()), Some("error"));
}

#[test]
fn test_other_intent_abandons_parked_slot() {
    let mut h = Harness::new();
    h.say("set up auto bill");
    assert_eq!(h.session.pending_action(), Some(PendingAction::SetupAutoPay));

    let turn = h.say("what is my balance");
    assert_eq!(turn.response, "Your current account balance is ₹100,000.00");
    assert!(h.session.pending_action().is_none());
}

#[test]
fn test_auto_pay_slot_answer() {
    let mut h = Harness::new();
    h.say("set up auto bill");

    let turn = h.say("the electricity one");
    assert_eq!(
        turn.action,
        Some(
            BankingAction::SetupAutoPay {
                bill_type: BillType::Electricity
            }
            .into()
        )
    );
    assert!(h.session.pending_action().is_none());
}

#[test]
fn test_block_card_needs_confirmation() {
    let mut h = Harness::new();

    let turn = h.say("block card, the credit one");
    assert_eq!(turn.response, "Your credit card will be blocked. Please confirm.");
    assert!(turn.action.is_none());
    assert_eq!(h.session.pending_action(), Some(PendingAction::BlockCard));

    let turn = h.say("yes");
    assert_eq!(turn.response, "Your credit card has been blocked.");
    assert_eq!(
        turn.action,
        Some(
            BankingAction::ManageCard {
                card_action: CardAction::Block,
                card_type: CardType::Credit,
                limit: None,
            }
            .into()
        )
    );
}

#[test]
fn test_card_limit_slot() {
    let mut h = Harness::new();

    // the keyword table reads "limit" as a credit limit question
    let turn = h.say_as("change my card limit", Intent::ManageCard);
    assert_eq!(turn.response, "What spending limit would you like to set?");
    assert_eq!(h.session.pending_action(), Some(PendingAction::SetCardLimit));

    let turn = h.say("25000");
    assert_eq!(
        turn.response,
        "Spending limit set to ₹25,000.00 for your debit card."
    );
}

#[test]
fn test_invalid_command_is_recorded_as_error() {
    let mut h = Harness::new();
    let turn = h.say("sing me a song");

    assert!(turn.response.starts_with("I'm not sure I understand."));
    assert_eq!(
        turn.action,
        Some(Clarification::new(ClarificationKind::InvalidCommand).into())
    );
    assert_eq!(h.session.history()[0].intent, "error");
}

#[test]
fn test_greeting_and_goodbye() {
    let mut h = Harness::new();
    assert_eq!(
        h.say("hello").response,
        "Hello! I'm your voice banking assistant. How can I help you today?"
    );
    assert_eq!(
        h.say("bye").response,
        "Thank you for using voice banking. Have a great day!"
    );
    assert_eq!(h.session.history().len(), 2);
}

#[test]
fn test_route_balance_needs() {
    let h = Harness::new();
    let balance = h.classifier.recognize("what is my balance");
    assert!(h.engine.route(&h.session, &balance).needs_balance());

    let loan = h.classifier.recognize("tell me about my loan");
    assert!(!h.engine.route(&h.session, &loan).needs_balance());
}
