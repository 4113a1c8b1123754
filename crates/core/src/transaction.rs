//! Transaction records as seen by the assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    LoanPayment,
}

impl TransactionKind {
    /// Kinds counted by the velocity check
    pub fn is_debit(&self) -> bool {
        matches!(
            self,
            TransactionKind::Withdrawal | TransactionKind::Transfer | TransactionKind::Payment
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filter over a user's completed transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    /// Only withdrawal, transfer and payment records
    pub debits_only: bool,
    /// Exact recipient name
    pub recipient: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub since: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    /// Completed debits created at or after `since`
    pub fn recent_debits(since: DateTime<Utc>) -> Self {
        Self {
            debits_only: true,
            recipient: None,
            since: Some(since),
        }
    }

    /// Completed transactions of any kind to `recipient`
    pub fn to_recipient(recipient: impl Into<String>) -> Self {
        Self {
            debits_only: false,
            recipient: Some(recipient.into()),
            since: None,
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if record.status != TransactionStatus::Completed {
            return false;
        }
        if self.debits_only && !record.kind.is_debit() {
            return false;
        }
        if let Some(recipient) = &self.recipient {
            if record.recipient_name.as_deref() != Some(recipient.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.created_at < since {
                return false;
            }
        }
        true
    }
}
