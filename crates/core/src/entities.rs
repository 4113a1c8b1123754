//! Structured fields extracted from an utterance

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting window for spending queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    LastMonth,
    LastWeek,
    LastYear,
    #[default]
    Month,
    Week,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::LastMonth => "last_month",
            Period::LastWeek => "last_week",
            Period::LastYear => "last_year",
            Period::Month => "month",
            Period::Week => "week",
        }
    }

    /// Spoken form used after "the last ..."
    pub fn spoken(&self) -> &'static str {
        match self {
            Period::LastMonth | Period::Month => "month",
            Period::LastWeek | Period::Week => "week",
            Period::LastYear => "year",
        }
    }

    /// Lookback window ending now
    pub fn lookback(&self) -> Duration {
        match self {
            Period::LastMonth | Period::Month => Duration::days(30),
            Period::LastWeek | Period::Week => Duration::days(7),
            Period::LastYear => Duration::days(365),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bills that support auto-pay, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Electricity,
    Phone,
    Water,
    Internet,
    Gas,
}

impl BillType {
    pub const ALL: [BillType; 5] = [
        BillType::Electricity,
        BillType::Phone,
        BillType::Water,
        BillType::Internet,
        BillType::Gas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Electricity => "electricity",
            BillType::Phone => "phone",
            BillType::Water => "water",
            BillType::Internet => "internet",
            BillType::Gas => "gas",
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Block,
    Unblock,
    SetLimit,
    #[default]
    View,
}

impl CardAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardAction::Block => "block",
            CardAction::Unblock => "unblock",
            CardAction::SetLimit => "set_limit",
            CardAction::View => "view",
        }
    }
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Debit,
    Credit,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Debit => "debit",
            CardType::Credit => "credit",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities extracted from one utterance.
///
/// Unmatched fields are absent; nothing here is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_type: Option<BillType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_action: Option<CardAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self == &Entities::default()
    }

    /// Merge a newer extraction into this one; fields set in `newer` win.
    pub fn merge(&mut self, newer: Entities) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if newer.$field.is_some() { self.$field = newer.$field; })*
            };
        }
        take!(
            amount,
            recipient_name,
            category,
            period,
            bill_type,
            card_action,
            card_type,
            account_number,
            limit
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_newer() {
        let mut parked = Entities {
            amount: Some(5000.0),
            account_number: Some("1234".to_string()),
            ..Default::default()
        };
        parked.merge(Entities {
            recipient_name: Some("Akash".to_string()),
            account_number: Some("9876".to_string()),
            ..Default::default()
        });

        assert_eq!(parked.amount, Some(5000.0));
        assert_eq!(parked.recipient_name.as_deref(), Some("Akash"));
        assert_eq!(parked.account_number.as_deref(), Some("9876"));
    }

    #[test]
    fn test_wire_shape() {
        let entities = Entities {
            amount: Some(5000.0),
            recipient_name: Some("Akash".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&entities).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "amount": 5000.0, "recipientName": "Akash" })
        );
        assert!(Entities::default().is_empty());
        assert!(!entities.is_empty());
    }

    #[test]
    fn test_period_spoken() {
        assert_eq!(Period::LastMonth.spoken(), "month");
        assert_eq!(Period::LastYear.spoken(), "year");
        assert_eq!(Period::default(), Period::Month);
        assert_eq!(Period::Week.lookback(), Duration::days(7));
    }
}
