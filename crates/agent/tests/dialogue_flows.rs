//! Full turns through the assistant with an in-test account store

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use voice_banking_agent::{AgentError, BankingAssistant, SessionRegistry};
use voice_banking_core::{
    AccountStore, ActionDescriptor, BankingAction, Clarification, ClarificationKind, Error,
    HistoryQuery, Intent, Result,
};
use voice_banking_text_processing::IntentService;

enum Balance {
    Fixed(f64),
    Slow(Duration),
    Down,
}

struct TestAccounts {
    balance: Balance,
}

#[async_trait]
impl AccountStore for TestAccounts {
    async fn get_balance(&self, user_id: &str) -> Result<f64> {
        if user_id == "ghost" {
            return Err(Error::AccountNotFound(user_id.to_string()));
        }
        match self.balance {
            Balance::Fixed(amount) => Ok(amount),
            Balance::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(0.0)
            }
            Balance::Down => Err(Error::Storage("connection refused".to_string())),
        }
    }

    async fn count_completed(&self, _user_id: &str, _query: &HistoryQuery) -> Result<usize> {
        Ok(0)
    }
}

fn assistant(balance: Balance) -> BankingAssistant {
    BankingAssistant::new(IntentService::keyword(), Arc::new(TestAccounts { balance }))
        .with_balance_timeout(Duration::from_millis(50))
}

#[tokio::test]
async fn test_transfer_round_trip_through_registry() {
    let assistant = assistant(Balance::Fixed(100_000.0));
    let registry = SessionRegistry::new(10);
    let handle = registry.get_or_create("demo", None).unwrap();

    let mut actions = Vec::new();
    for text in ["transfer ₹5,000 to Akash", "yes", "123456"] {
        let mut session = handle.lock().await;
        let reply = assistant.process_utterance(&mut session, text).await.unwrap();
        actions.extend(reply.action);
    }

    let transfers: Vec<_> = actions
        .iter()
        .filter(|a| a.action_name() == Some("transfer_funds"))
        .collect();
    assert_eq!(
        transfers,
        vec![&ActionDescriptor::Banking(BankingAction::TransferFunds {
            otp: "123456".to_string(),
            amount: 5000.0,
            recipient_name: "Akash".to_string(),
        })]
    );

    let snapshot = handle.snapshot().await;
    assert!(snapshot.pending_action.is_none());
    assert!(!snapshot.requires_confirmation);
    assert!(!snapshot.requires_otp);
    assert_eq!(snapshot.history.len(), 3);
}

#[tokio::test]
async fn test_reply_carries_classification() {
    let assistant = assistant(Balance::Fixed(2_500.0));
    let registry = SessionRegistry::new(10);
    let handle = registry.get_or_create("demo", None).unwrap();
    let mut session = handle.lock().await;

    let reply = assistant
        .process_utterance(&mut session, "what's my balance")
        .await
        .unwrap();
    assert_eq!(reply.intent, Intent::CheckBalance);
    assert_eq!(reply.confidence, 0.8);
    assert_eq!(reply.response_text, "Your current account balance is ₹2,500.00");
    assert_eq!(reply.session_id, handle.id);

    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["action"]["action"], "check_balance");
    assert_eq!(json["responseText"], reply.response_text);
}

#[tokio::test]
async fn test_ambiguous_utterance_asks_to_rephrase() {
    let assistant = assistant(Balance::Fixed(0.0));
    let registry = SessionRegistry::new(10);
    let handle = registry.get_or_create("demo", None).unwrap();
    let mut session = handle.lock().await;

    let reply = assistant
        .process_utterance(&mut session, "purple elephants")
        .await
        .unwrap();
    assert_eq!(reply.intent, Intent::Other);
    assert_eq!(reply.confidence, 0.5);
    assert!(reply.response_text.ends_with(
        "You can ask me to: check balance, transfer money, view transactions, spending summary, or inquire about loans."
    ));
    assert_eq!(
        reply.action,
        Some(Clarification::new(ClarificationKind::InvalidCommand).into())
    );
}

#[tokio::test]
async fn test_balance_outage_degrades_to_clarification() {
    let assistant = assistant(Balance::Down);
    let mut session = voice_banking_agent::DialogueSession::new("s1", "demo");

    let reply = assistant
        .process_utterance(&mut session, "check balance")
        .await
        .unwrap();
    assert_eq!(
        reply.action,
        Some(Clarification::new(ClarificationKind::NetworkError).into())
    );
    assert_eq!(session.history()[0].intent, "error");
}

#[tokio::test]
async fn test_slow_balance_read_times_out() {
    let assistant = assistant(Balance::Slow(Duration::from_secs(5)));
    let mut session = voice_banking_agent::DialogueSession::new("s1", "demo");

    let reply = assistant
        .process_utterance(&mut session, "transfer ₹100 to Ravi")
        .await
        .unwrap();
    assert_eq!(
        reply.response_text,
        "The request is taking too long. Please try again."
    );
    assert!(session.pending_action().is_none());
}

#[tokio::test]
async fn test_balance_not_read_for_other_intents() {
    let assistant = assistant(Balance::Down);
    let mut session = voice_banking_agent::DialogueSession::new("s1", "demo");

    let reply = assistant
        .process_utterance(&mut session, "show my spending last week")
        .await
        .unwrap();
    assert_eq!(
        reply.response_text,
        "Fetching your spending summary for the last week..."
    );
}

#[tokio::test]
async fn test_unknown_account_is_an_error() {
    let assistant = assistant(Balance::Fixed(1.0));
    let mut session = voice_banking_agent::DialogueSession::new("s1", "ghost");

    let err = assistant
        .process_utterance(&mut session, "check balance")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Core(Error::AccountNotFound(_))));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let assistant = Arc::new(assistant(Balance::Fixed(50_000.0)));
    let registry = Arc::new(SessionRegistry::new(10));

    let mut tasks = Vec::new();
    for (user, recipient) in [("alice", "Akash"), ("bob", "Priya")] {
        let assistant = Arc::clone(&assistant);
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let handle = registry.get_or_create(user, None).unwrap();
            let mut session = handle.lock().await;
            let text = format!("transfer ₹1,000 to {}", recipient);
            assistant.process_utterance(&mut session, &text).await.unwrap();
            session.pending_entities().cloned()
        }));
    }

    let mut recipients = Vec::new();
    for task in tasks {
        let entities = task.await.unwrap().unwrap();
        recipients.extend(entities.recipient_name);
    }
    recipients.sort();
    assert_eq!(recipients, vec!["Akash".to_string(), "Priya".to_string()]);
}
