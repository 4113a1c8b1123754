//! Risk alerts raised by the fraud engine

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LargeTransaction,
    HighPercentageTransaction,
    RapidTransactions,
    NewRecipientLargeAmount,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LargeTransaction => "large_transaction",
            AlertType::HighPercentageTransaction => "high_percentage_transaction",
            AlertType::RapidTransactions => "rapid_transactions",
            AlertType::NewRecipientLargeAmount => "new_recipient_large_amount",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory risk signal; never blocks a transfer on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_wire_shape() {
        let alert = Alert::new(
            AlertType::RapidTransactions,
            Severity::High,
            "6 transactions in last 10 minutes",
            "Please verify all transactions are authorized",
        );
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["alertType"], "rapid_transactions");
        assert_eq!(json["severity"], "high");
        assert!(Severity::High > Severity::Medium);
    }
}
