//! Pure alert rules; the scorer feeds them collaborator data

use voice_banking_core::{format_inr, Alert, AlertType, Severity};

use crate::FraudThresholds;

/// Large absolute amount, else a large share of `balance`.
///
/// `balance` is `None` when it could not be read; only the absolute rule
/// applies then. A non-positive balance never matches the share rule.
pub fn check_transaction_size(
    thresholds: &FraudThresholds,
    amount: f64,
    balance: Option<f64>,
) -> Option<Alert> {
    if amount > thresholds.large_transaction {
        return Some(Alert::new(
            AlertType::LargeTransaction,
            Severity::High,
            format!("Large transaction detected: {}", format_inr(amount)),
            "Please verify this transaction carefully",
        ));
    }

    let balance = balance.filter(|b| *b > 0.0)?;
    if amount > balance * thresholds.balance_ratio {
        return Some(Alert::new(
            AlertType::HighPercentageTransaction,
            Severity::Medium,
            format!("Transaction is {:.1}% of your balance", amount / balance * 100.0),
            "Please confirm this is intentional",
        ));
    }

    None
}

/// `recent` completed debits already inside the window
pub fn check_rapid_transactions(thresholds: &FraudThresholds, recent: usize) -> Option<Alert> {
    if recent < thresholds.rapid_count {
        return None;
    }
    // the transfer being scored is not recorded yet
    Some(Alert::new(
        AlertType::RapidTransactions,
        Severity::High,
        format!(
            "{} transactions in last {} minutes",
            recent + 1,
            thresholds.rapid_window_minutes
        ),
        "Please verify all transactions are authorized",
    ))
}

/// `previous` completed transactions to `recipient`
pub fn check_new_recipient(
    thresholds: &FraudThresholds,
    recipient: &str,
    amount: f64,
    previous: usize,
) -> Option<Alert> {
    if previous > 0 || amount <= thresholds.new_recipient_amount {
        return None;
    }
    Some(Alert::new(
        AlertType::NewRecipientLargeAmount,
        Severity::Medium,
        format!(
            "First transaction to {} with large amount {}",
            recipient,
            format_inr(amount)
        ),
        "Please verify recipient details",
    ))
}
