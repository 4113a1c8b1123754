//! Action descriptors handed from the dialogue engine to the transport
//!
//! A turn yields response text plus at most one descriptor. The transport
//! executes banking actions (queries, transfers); clarifications carry only
//! the error kind that triggered them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BillType, CardAction, CardType, Period};

/// Side effect requested by a dialogue turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BankingAction {
    CheckBalance {
        balance: f64,
    },
    /// Ready for execution; only ever emitted with a captured OTP
    #[serde(rename_all = "camelCase")]
    TransferFunds {
        otp: String,
        amount: f64,
        recipient_name: String,
    },
    #[serde(rename_all = "camelCase")]
    PendingTransfer {
        requires_otp: bool,
    },
    ViewTransactions,
    LoanInquiry,
    InterestInquiry,
    CreditLimitInquiry,
    SetReminder,
    PaymentAlert,
    SpendingSummary {
        period: Period,
    },
    CategorySpending {
        category: String,
        period: Period,
    },
    ViewNotifications,
    #[serde(rename_all = "camelCase")]
    SetupAutoPay {
        bill_type: BillType,
    },
    RequestChequebook,
    #[serde(rename_all = "camelCase")]
    ManageCard {
        card_action: CardAction,
        card_type: CardType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<f64>,
    },
}

impl BankingAction {
    /// Value of the `action` discriminant on the wire
    pub fn name(&self) -> &'static str {
        match self {
            BankingAction::CheckBalance { .. } => "check_balance",
            BankingAction::TransferFunds { .. } => "transfer_funds",
            BankingAction::PendingTransfer { .. } => "pending_transfer",
            BankingAction::ViewTransactions => "view_transactions",
            BankingAction::LoanInquiry => "loan_inquiry",
            BankingAction::InterestInquiry => "interest_inquiry",
            BankingAction::CreditLimitInquiry => "credit_limit_inquiry",
            BankingAction::SetReminder => "set_reminder",
            BankingAction::PaymentAlert => "payment_alert",
            BankingAction::SpendingSummary { .. } => "spending_summary",
            BankingAction::CategorySpending { .. } => "category_spending",
            BankingAction::ViewNotifications => "view_notifications",
            BankingAction::SetupAutoPay { .. } => "setup_auto_pay",
            BankingAction::RequestChequebook => "request_chequebook",
            BankingAction::ManageCard { .. } => "manage_card",
        }
    }
}

/// Reason a turn fell back to a clarifying question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    InsufficientInfo,
    InvalidAmount,
    InvalidRecipient,
    InvalidCommand,
    NetworkError,
    Timeout,
    Unknown,
}

impl ClarificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClarificationKind::InsufficientInfo => "insufficient_info",
            ClarificationKind::InvalidAmount => "invalid_amount",
            ClarificationKind::InvalidRecipient => "invalid_recipient",
            ClarificationKind::InvalidCommand => "invalid_command",
            ClarificationKind::NetworkError => "network_error",
            ClarificationKind::Timeout => "timeout",
            ClarificationKind::Unknown => "unknown",
        }
    }

    /// Parse an error-type name; anything unrecognised is `Unknown`
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "insufficient_info" => ClarificationKind::InsufficientInfo,
            "invalid_amount" => ClarificationKind::InvalidAmount,
            "invalid_recipient" => ClarificationKind::InvalidRecipient,
            "invalid_command" => ClarificationKind::InvalidCommand,
            "network_error" => ClarificationKind::NetworkError,
            "timeout" => ClarificationKind::Timeout,
            _ => ClarificationKind::Unknown,
        }
    }
}

impl fmt::Display for ClarificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clarification {
    pub error: ClarificationKind,
    pub requires_clarification: bool,
}

impl Clarification {
    pub fn new(error: ClarificationKind) -> Self {
        Self {
            error,
            requires_clarification: true,
        }
    }
}

/// Structured side channel of a dialogue turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionDescriptor {
    Banking(BankingAction),
    Clarification(Clarification),
}

impl ActionDescriptor {
    pub fn banking(&self) -> Option<&BankingAction> {
        match self {
            ActionDescriptor::Banking(action) => Some(action),
            ActionDescriptor::Clarification(_) => None,
        }
    }

    /// Action name, or `None` for a clarification
    pub fn action_name(&self) -> Option<&'static str> {
        self.banking().map(BankingAction::name)
    }
}

impl From<BankingAction> for ActionDescriptor {
    fn from(action: BankingAction) -> Self {
        ActionDescriptor::Banking(action)
    }
}

impl From<Clarification> for ActionDescriptor {
    fn from(clarification: Clarification) -> Self {
        ActionDescriptor::Clarification(clarification)
    }
}
