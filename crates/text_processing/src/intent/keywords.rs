//! Keyword classifier

use once_cell::sync::Lazy;
use regex::Regex;

use voice_banking_core::{Intent, IntentResult};

use super::{with_entities, IntentClassifier};
use crate::EntityExtractor;

/// Confidence assigned to a keyword table hit
pub const KEYWORD_CONFIDENCE: f32 = 0.8;
/// Confidence assigned to greeting and farewell words
pub const SOCIAL_CONFIDENCE: f32 = 0.9;
/// Confidence when nothing matched
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

/// Per-intent keywords. The first intent with any matching keyword wins, so
/// order decides overlaps ("alert" is a reminder before it is a payment alert).
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::CheckBalance,
        &["balance", "account balance", "how much", "money in account"],
    ),
    (
        Intent::TransferFunds,
        &["transfer", "send money", "pay", "send to"],
    ),
    (
        Intent::ViewTransactions,
        &["transactions", "history", "statement", "recent payments"],
    ),
    (
        Intent::LoanInquiry,
        &["loan", "loan amount", "loan balance", "borrow"],
    ),
    (
        Intent::InterestInquiry,
        &["interest", "interest rate", "rate of interest"],
    ),
    (
        Intent::CreditLimitInquiry,
        &["credit limit", "credit card limit", "limit"],
    ),
    (Intent::SetReminder, &["reminder", "remind me", "alert"]),
    (
        Intent::PaymentAlert,
        &["alert", "notification", "payment reminder"],
    ),
    (
        Intent::SpendingSummary,
        &[
            "spending",
            "expenses",
            "how much spent",
            "spending summary",
            "expense report",
        ],
    ),
    (
        Intent::CategorySpending,
        &["spend on food", "spent on", "expenses for", "how much on"],
    ),
    (
        Intent::FraudAlert,
        &["fraud", "suspicious", "unusual", "fraudulent"],
    ),
    (
        Intent::ViewNotifications,
        &["notifications", "alerts", "notify me", "show alerts"],
    ),
    (
        Intent::SetupAutoPay,
        &["auto pay", "automatic payment", "auto bill", "recurring payment"],
    ),
    (
        Intent::RequestChequebook,
        &["cheque book", "chequebook", "request cheque", "order cheque"],
    ),
    (
        Intent::ManageCard,
        &["block card", "unblock card", "card limit", "card settings"],
    ),
];

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:hello|hi|hey|good morning|good afternoon)\b").unwrap()
});

static FAREWELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:bye|goodbye|see you)\b").unwrap());

/// Deterministic classifier over a fixed keyword table
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier {
    extractor: EntityExtractor,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// First intent in table order with a keyword contained in `lowered`
    fn match_table(lowered: &str) -> Option<Intent> {
        INTENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(intent, _)| *intent)
    }
}

impl IntentClassifier for KeywordClassifier {
    fn recognize(&self, text: &str) -> IntentResult {
        let lowered = text.to_lowercase();

        if let Some(intent) = Self::match_table(&lowered) {
            return with_entities(&self.extractor, text, intent, KEYWORD_CONFIDENCE);
        }

        if GREETING.is_match(&lowered) {
            return IntentResult::new(Intent::Greeting, SOCIAL_CONFIDENCE, Default::default());
        }

        if FAREWELL.is_match(&lowered) {
            return IntentResult::new(Intent::Goodbye, SOCIAL_CONFIDENCE, Default::default());
        }

        with_entities(&self.extractor, text, Intent::Other, FALLBACK_CONFIDENCE)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
