//! Action executor
//!
//! Runs the side effects named by a dialogue turn's action descriptor:
//! replaces "fetching..." placeholders with real figures and carries out
//! OTP-bearing transfers after an advisory risk check.

use serde::Serialize;
use std::sync::Arc;

use voice_banking_agent::{AssistantReply, SessionHandle};
use voice_banking_core::{
    format_inr, Alert, BankingAction, InsightsProvider, Period, TransactionRecord,
    TransferGateway, TransferRequest,
};
use voice_banking_fraud::RiskScorer;

/// Notification messages read out in one reply
const NOTIFICATION_PREVIEW: usize = 3;

/// Outcome of an executed transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TransactionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    fn completed(record: TransactionRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A dialogue turn after its side effects ran
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    #[serde(flatten)]
    pub reply: AssistantReply,
    pub alerts: Vec<Alert>,
    pub action_result: Option<ActionResult>,
}

pub struct ActionExecutor {
    insights: Arc<dyn InsightsProvider>,
    transfers: Arc<dyn TransferGateway>,
    scorer: RiskScorer,
}

impl ActionExecutor {
    pub fn new(
        insights: Arc<dyn InsightsProvider>,
        transfers: Arc<dyn TransferGateway>,
        scorer: RiskScorer,
    ) -> Self {
        Self {
            insights,
            transfers,
            scorer,
        }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Execute the reply's action for the session behind `handle`
    pub async fn apply(&self, handle: &SessionHandle, mut reply: AssistantReply) -> TurnOutcome {
        let mut alerts = Vec::new();
        let mut action_result = None;
        let user_id = handle.user_id.as_str();

        match reply.action.as_ref().and_then(|a| a.banking()).cloned() {
            Some(BankingAction::SpendingSummary { period }) => {
                if let Some(text) = self.spending_text(user_id, period).await {
                    reply.response_text = text;
                }
            }
            Some(BankingAction::CategorySpending { category, period }) => {
                if let Some(text) = self.category_text(user_id, &category, period).await {
                    reply.response_text = text;
                }
            }
            Some(BankingAction::ViewNotifications) => {
                if let Some(text) = self.notifications_text(user_id).await {
                    reply.response_text = text;
                }
            }
            Some(BankingAction::TransferFunds {
                otp,
                amount,
                recipient_name,
            }) if !otp.is_empty() => {
                let request = TransferRequest {
                    user_id: user_id.to_string(),
                    amount,
                    recipient_name,
                    recipient_account: None,
                    otp,
                };
                let (raised, result) = self.transfer(handle, request).await;
                alerts = raised;
                action_result = Some(result);
            }
            _ => {}
        }

        TurnOutcome {
            reply,
            alerts,
            action_result,
        }
    }

    async fn transfer(
        &self,
        handle: &SessionHandle,
        request: TransferRequest,
    ) -> (Vec<Alert>, ActionResult) {
        if !handle.is_active() {
            tracing::warn!(session_id = %handle.id, "Session closed, transfer not applied");
            record_transfer("session_closed");
            return (Vec::new(), ActionResult::failed("session_closed"));
        }

        // advisory only; alerts never block the transfer
        let alerts = self
            .scorer
            .detect_fraud(
                &request.user_id,
                request.amount,
                Some(request.recipient_name.as_str()),
            )
            .await;

        let amount = request.amount;
        match self.transfers.execute_transfer(request).await {
            Ok(record) => {
                tracing::info!(
                    session_id = %handle.id,
                    transaction_id = %record.id,
                    amount,
                    alert_count = alerts.len(),
                    "Transfer executed"
                );
                record_transfer("completed");
                (alerts, ActionResult::completed(record))
            }
            Err(e) => {
                tracing::warn!(session_id = %handle.id, error = %e, "Transfer rejected");
                record_transfer(e.code());
                (alerts, ActionResult::failed(e.code()))
            }
        }
    }

    async fn spending_text(&self, user_id: &str, period: Period) -> Option<String> {
        let summary = match self.insights.spending_summary(user_id, period).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Spending summary unavailable");
                return None;
            }
        };
        if summary.total_spending == 0.0 {
            return None;
        }

        Some(format!(
            "Your spending summary for the last {}: Total spending: {}, Total income: {}, Savings: {}. Top spending category: {}.",
            period.spoken(),
            format_inr(summary.total_spending),
            format_inr(summary.total_income),
            format_inr(summary.savings),
            summary.top_category.as_deref().unwrap_or("other"),
        ))
    }

    async fn category_text(&self, user_id: &str, category: &str, period: Period) -> Option<String> {
        let spending = match self.insights.category_spending(user_id, category, period).await {
            Ok(spending) => spending,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Category spending unavailable");
                return None;
            }
        };
        if spending.amount == 0.0 {
            return None;
        }

        Some(format!(
            "You spent {} on {} in the last {}.",
            format_inr(spending.amount),
            category,
            period.spoken()
        ))
    }

    async fn notifications_text(&self, user_id: &str) -> Option<String> {
        let notifications = match self.insights.notifications(user_id).await {
            Ok(notifications) => notifications,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Notifications unavailable");
                return None;
            }
        };
        if notifications.is_empty() {
            return Some("You have no new notifications.".to_string());
        }

        let preview: Vec<&str> = notifications
            .iter()
            .take(NOTIFICATION_PREVIEW)
            .map(|n| n.message.as_str())
            .collect();
        Some(format!(
            "You have {} notifications. {}",
            notifications.len(),
            preview.join(". ")
        ))
    }
}

fn record_transfer(outcome: &'static str) {
    metrics::counter!("voice_banking_transfers_total", "outcome" => outcome).increment(1);
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("thresholds", self.scorer.thresholds())
            .finish()
    }
}
