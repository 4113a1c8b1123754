//! Banking Entity Extraction
//!
//! Pulls structured fields out of a raw utterance:
//! - Amounts with a currency marker (₹, rs, rupees) or after the word "amount"
//! - Recipient names (capitalised word runs after "to"/"for")
//! - Spending category and reporting period
//! - Bill type for auto-pay
//! - Card action and card type
//! - Account numbers (4 to 16 digit runs)
//!
//! Extraction is intent-conditioned and never fails: unmatched fields are
//! simply absent. Patterns are case-insensitive except the recipient capture,
//! which relies on capitalisation to find the name.
//!
//! # Example
//!
//! ```
//! use voice_banking_core::Intent;
//! use voice_banking_text_processing::EntityExtractor;
//!
//! let entities = EntityExtractor::new().extract("transfer ₹5,000 to Akash", Intent::TransferFunds);
//!
//! assert_eq!(entities.amount, Some(5000.0));
//! assert_eq!(entities.recipient_name.as_deref(), Some("Akash"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use voice_banking_core::{BillType, CardAction, CardType, Entities, Intent, Period};

const NUMBER: &str = r"([0-9]+(?:,[0-9]{2,3})*(?:\.[0-9]{1,2})?)";

/// Amount patterns, tried in order; first match wins
static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let leading = r"(?:₹|\brs\.?|\brupees?\b)";
    let trailing = r"(?:₹|rs\b|rupees?\b)";
    [
        format!(r"(?i){}\s*{}", leading, NUMBER),
        format!(r"(?i){}\s*{}", NUMBER, trailing),
        format!(r"(?i)\bamount\s*(?:of\s*)?{}?\s*{}", leading, NUMBER),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Recipient patterns; the name itself must be capitalised
static RECIPIENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(?i:to|for)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"(?i:transfer).*?\b(?i:to)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CATEGORY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:spent|spend|expenses?)\s+(?:on|for)\s+(\w+)",
        r"(?i)(\w+)\s+(?:spending|expenses?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ACCOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:account\s*)?(?:number\s*)?([0-9]{4,16})").unwrap());

static BARE_AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b{}\b", NUMBER)).unwrap());

static BARE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s*[.!]?\s*$").unwrap()
});

static OTP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]{4,6}\b").unwrap());

/// Period phrases in priority order
const PERIOD_PHRASES: [(&[&str], Period); 5] = [
    (&["last month", "past month"], Period::LastMonth),
    (&["last week", "past week"], Period::LastWeek),
    (&["last year", "past year"], Period::LastYear),
    (&["this month"], Period::Month),
    (&["this week"], Period::Week),
];

/// Intent-conditioned entity extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every entity relevant to `intent`
    pub fn extract(&self, text: &str, intent: Intent) -> Entities {
        let mut entities = Entities {
            amount: self.extract_amount(text),
            account_number: self.extract_account_number(text),
            ..Default::default()
        };

        match intent {
            Intent::TransferFunds => {
                entities.recipient_name = self.extract_recipient(text);
            },
            Intent::CategorySpending => {
                entities.category = self.extract_category(text);
                entities.period = self.extract_period(text);
            },
            Intent::SpendingSummary => {
                entities.period = self.extract_period(text);
            },
            Intent::SetupAutoPay => {
                entities.bill_type = self.extract_bill_type(text);
            },
            Intent::ManageCard => {
                entities.card_action = self.extract_card_action(text);
                entities.card_type = self.extract_card_type(text);
                if entities.card_action == Some(CardAction::SetLimit) {
                    entities.limit = entities.amount.or_else(|| self.extract_bare_amount(text));
                }
            },
            _ => {},
        }

        entities
    }

    /// Currency-marked amount with grouping separators stripped
    pub fn extract_amount(&self, text: &str) -> Option<f64> {
        AMOUNT_PATTERNS
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| parse_number(&caps[1]))
    }

    pub fn extract_recipient(&self, text: &str) -> Option<String> {
        RECIPIENT_PATTERNS
            .iter()
            .find_map(|re| re.captures(text))
            .map(|caps| caps[1].to_string())
    }

    /// Lower-cased spending category
    pub fn extract_category(&self, text: &str) -> Option<String> {
        CATEGORY_PATTERNS
            .iter()
            .find_map(|re| re.captures(text))
            .map(|caps| caps[1].to_lowercase())
    }

    pub fn extract_period(&self, text: &str) -> Option<Period> {
        let lower = text.to_lowercase();
        PERIOD_PHRASES
            .iter()
            .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
            .map(|(_, period)| *period)
    }

    pub fn extract_bill_type(&self, text: &str) -> Option<BillType> {
        let lower = text.to_lowercase();
        BillType::ALL
            .iter()
            .copied()
            .find(|bill| lower.contains(bill.as_str()))
    }

    pub fn extract_card_action(&self, text: &str) -> Option<CardAction> {
        let lower = text.to_lowercase();
        // "unblock" contains "block"
        if lower.contains("unblock") {
            Some(CardAction::Unblock)
        } else if lower.contains("block") {
            Some(CardAction::Block)
        } else if lower.contains("limit") {
            Some(CardAction::SetLimit)
        } else {
            None
        }
    }

    pub fn extract_card_type(&self, text: &str) -> Option<CardType> {
        let lower = text.to_lowercase();
        if lower.contains("debit") {
            Some(CardType::Debit)
        } else if lower.contains("credit") {
            Some(CardType::Credit)
        } else {
            None
        }
    }

    pub fn extract_account_number(&self, text: &str) -> Option<String> {
        ACCOUNT_PATTERN
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// First plain number, for answers like "5000" to an amount prompt
    pub fn extract_bare_amount(&self, text: &str) -> Option<f64> {
        BARE_AMOUNT_PATTERN
            .captures(text)
            .and_then(|caps| parse_number(&caps[1]))
    }

    /// Whole utterance as a name, for answers like "Akash" to a recipient prompt
    pub fn extract_bare_name(&self, text: &str) -> Option<String> {
        BARE_NAME_PATTERN
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    /// First standalone 4 to 6 digit token
    pub fn extract_otp(&self, text: &str) -> Option<String> {
        OTP_PATTERN.find(text).map(|m| m.as_str().to_string())
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
