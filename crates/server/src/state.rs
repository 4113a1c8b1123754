//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use voice_banking_agent::{AgentError, BankingAssistant, SessionHandle, SessionRegistry};
use voice_banking_config::Settings;
use voice_banking_fraud::{FraudThresholds, RiskScorer};
use voice_banking_text_processing::IntentService;

use crate::executor::{ActionExecutor, TurnOutcome};
use crate::ledger::InMemoryLedger;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionRegistry>,
    pub assistant: Arc<BankingAssistant>,
    pub executor: Arc<ActionExecutor>,
    /// Bank collaborator behind every trait the assistant uses
    pub ledger: Arc<InMemoryLedger>,
}

impl AppState {
    /// Create state with a ledger seeded from the demo accounts
    pub fn new(settings: Settings) -> Self {
        let ledger = Arc::new(InMemoryLedger::from_config(&settings.demo));
        Self::with_ledger(settings, ledger)
    }

    pub fn with_ledger(settings: Settings, ledger: Arc<InMemoryLedger>) -> Self {
        Self::with_intents(
            IntentService::from_config(&settings.classifier),
            settings,
            ledger,
        )
    }

    /// Create state around an already-built classifier service
    pub fn with_intents(
        intents: IntentService,
        settings: Settings,
        ledger: Arc<InMemoryLedger>,
    ) -> Self {
        let scorer = RiskScorer::new(ledger.clone(), FraudThresholds::from(&settings.fraud));
        let assistant = BankingAssistant::new(intents, ledger.clone())
            .with_balance_timeout(Duration::from_millis(settings.fraud.store_timeout_ms));
        let executor = ActionExecutor::new(ledger.clone(), ledger.clone(), scorer);

        tracing::info!(
            strategy = assistant.intents().strategy(),
            max_sessions = settings.sessions.max_sessions,
            "Initialized application state"
        );

        Self {
            sessions: Arc::new(SessionRegistry::from_config(&settings.sessions)),
            assistant: Arc::new(assistant),
            executor: Arc::new(executor),
            ledger,
            settings: Arc::new(settings),
        }
    }

    pub fn scorer(&self) -> &RiskScorer {
        self.executor.scorer()
    }

    /// Run one utterance through the session behind `handle`.
    ///
    /// The session lock is held until the executor finishes, so the next
    /// utterance for the same session waits for this one's side effects.
    pub async fn process_turn(
        &self,
        handle: &SessionHandle,
        text: &str,
    ) -> Result<TurnOutcome, ServerError> {
        let mut dialogue = handle.lock().await;
        if !handle.is_active() {
            return Err(AgentError::SessionClosed(handle.id.clone()).into());
        }

        let reply = self.assistant.process_utterance(&mut dialogue, text).await?;
        let outcome = self.executor.apply(handle, reply).await;
        drop(dialogue);

        Ok(outcome)
    }
}
