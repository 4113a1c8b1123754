//! Composition root for one dialogue turn
//!
//! Classify, read the balance when the routed handler needs it, then
//! advance the session. Collaborator trouble becomes a clarifying reply;
//! only an unknown account is an error.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use voice_banking_config::constants::fraud::STORE_TIMEOUT_MS;
use voice_banking_core::{
    AccountStore, ActionDescriptor, ClarificationKind, Entities, Error, Intent,
};
use voice_banking_text_processing::IntentService;

use crate::engine::{DialogueEngine, DialogueTurn};
use crate::session::DialogueSession;
use crate::Result;

/// Everything the transport needs from one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub session_id: String,
    pub transcript: String,
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
    pub response_text: String,
    pub action: Option<ActionDescriptor>,
}

pub struct BankingAssistant {
    intents: IntentService,
    engine: DialogueEngine,
    accounts: Arc<dyn AccountStore>,
    balance_timeout: Duration,
}

impl BankingAssistant {
    pub fn new(intents: IntentService, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            intents,
            engine: DialogueEngine::new(),
            accounts,
            balance_timeout: Duration::from_millis(STORE_TIMEOUT_MS),
        }
    }

    pub fn with_balance_timeout(mut self, timeout: Duration) -> Self {
        self.balance_timeout = timeout;
        self
    }

    pub fn intents(&self) -> &IntentService {
        &self.intents
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    /// Advance `session` by one utterance.
    ///
    /// The caller must hold the session exclusively for the whole turn.
    pub async fn process_utterance(
        &self,
        session: &mut DialogueSession,
        text: &str,
    ) -> Result<AssistantReply> {
        let started = Instant::now();
        let classified = self.intents.recognize(text).await;
        let route = self.engine.route(session, &classified);

        let turn = if route.needs_balance() {
            let balance = self.balance(session.user_id()).await;
            match balance {
                Ok(balance) => self.engine.process(session, text, &classified, balance),
                Err(e @ Error::AccountNotFound(_)) => return Err(e.into()),
                Err(Error::Timeout(reason)) => {
                    tracing::warn!(session_id = %session.id(), %reason, "Balance read timed out");
                    self.engine.clarify(session, text, ClarificationKind::Timeout)
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id(), error = %e, "Balance unavailable");
                    self.engine.clarify(session, text, ClarificationKind::NetworkError)
                }
            }
        } else {
            self.engine.process(session, text, &classified, 0.0)
        };

        metrics::counter!("voice_banking_turns_total", "intent" => classified.intent.as_str())
            .increment(1);
        metrics::histogram!("voice_banking_turn_latency_seconds")
            .record(started.elapsed().as_secs_f64());

        tracing::debug!(
            session_id = %session.id(),
            intent = %classified.intent,
            confidence = classified.confidence,
            action = turn.action.as_ref().and_then(|a| a.action_name()).unwrap_or("none"),
            "Turn complete"
        );

        let DialogueTurn { response, action } = turn;
        Ok(AssistantReply {
            session_id: session.id().to_string(),
            transcript: text.to_string(),
            intent: classified.intent,
            confidence: classified.confidence,
            entities: classified.entities,
            response_text: response,
            action,
        })
    }

    async fn balance(&self, user_id: &str) -> std::result::Result<f64, Error> {
        tokio::time::timeout(self.balance_timeout, self.accounts.get_balance(user_id))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "balance read exceeded {}ms",
                    self.balance_timeout.as_millis()
                ))
            })?
    }
}

impl std::fmt::Debug for BankingAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankingAssistant")
            .field("intents", &self.intents)
            .field("balance_timeout", &self.balance_timeout)
            .finish()
    }
}
