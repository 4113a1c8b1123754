//! Intent vocabulary and classification results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Entities;

/// Fixed banking intent vocabulary.
///
/// Declaration order matches the class index order of the intent model,
/// so `Intent::ALL[i]` is the intent for raw class `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckBalance,
    TransferFunds,
    ViewTransactions,
    LoanInquiry,
    InterestInquiry,
    CreditLimitInquiry,
    SetReminder,
    PaymentAlert,
    SpendingSummary,
    CategorySpending,
    FraudAlert,
    ViewNotifications,
    SetupAutoPay,
    RequestChequebook,
    ManageCard,
    Greeting,
    Goodbye,
    Other,
}

impl Intent {
    pub const ALL: [Intent; 18] = [
        Intent::CheckBalance,
        Intent::TransferFunds,
        Intent::ViewTransactions,
        Intent::LoanInquiry,
        Intent::InterestInquiry,
        Intent::CreditLimitInquiry,
        Intent::SetReminder,
        Intent::PaymentAlert,
        Intent::SpendingSummary,
        Intent::CategorySpending,
        Intent::FraudAlert,
        Intent::ViewNotifications,
        Intent::SetupAutoPay,
        Intent::RequestChequebook,
        Intent::ManageCard,
        Intent::Greeting,
        Intent::Goodbye,
        Intent::Other,
    ];

    /// Intent for a raw model class index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire name of the intent
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CheckBalance => "check_balance",
            Intent::TransferFunds => "transfer_funds",
            Intent::ViewTransactions => "view_transactions",
            Intent::LoanInquiry => "loan_inquiry",
            Intent::InterestInquiry => "interest_inquiry",
            Intent::CreditLimitInquiry => "credit_limit_inquiry",
            Intent::SetReminder => "set_reminder",
            Intent::PaymentAlert => "payment_alert",
            Intent::SpendingSummary => "spending_summary",
            Intent::CategorySpending => "category_spending",
            Intent::FraudAlert => "fraud_alert",
            Intent::ViewNotifications => "view_notifications",
            Intent::SetupAutoPay => "setup_auto_pay",
            Intent::RequestChequebook => "request_chequebook",
            Intent::ManageCard => "manage_card",
            Intent::Greeting => "greeting",
            Intent::Goodbye => "goodbye",
            Intent::Other => "other",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == name)
            .ok_or_else(|| format!("unknown intent: {}", s))
    }
}

/// Output of intent classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Always within [0, 1]
    pub confidence: f32,
    #[serde(default)]
    pub entities: Entities,
}

impl IntentResult {
    pub fn new(intent: Intent, confidence: f32, entities: Entities) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            intent,
            confidence,
            entities,
        }
    }
}
