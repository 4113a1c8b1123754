//! Risk scorer over an account store

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use voice_banking_config::FraudConfig;
use voice_banking_core::{AccountStore, Alert, Error, HistoryQuery, Result};

use crate::checks::{check_new_recipient, check_rapid_transactions, check_transaction_size};

/// Thresholds resolved from [`FraudConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct FraudThresholds {
    pub large_transaction: f64,
    pub balance_ratio: f64,
    pub rapid_count: usize,
    pub rapid_window_minutes: u64,
    pub new_recipient_amount: f64,
    /// Budget for each store read
    pub store_timeout: Duration,
}

impl From<&FraudConfig> for FraudThresholds {
    fn from(config: &FraudConfig) -> Self {
        Self {
            large_transaction: config.large_transaction_threshold,
            balance_ratio: config.balance_ratio_threshold,
            rapid_count: config.rapid_transaction_count,
            rapid_window_minutes: config.rapid_window_minutes,
            new_recipient_amount: config.new_recipient_amount_threshold,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self::from(&FraudConfig::default())
    }
}

/// Read-only fraud engine
#[derive(Clone)]
pub struct RiskScorer {
    store: Arc<dyn AccountStore>,
    thresholds: FraudThresholds,
}

impl RiskScorer {
    pub fn new(store: Arc<dyn AccountStore>, thresholds: FraudThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> &FraudThresholds {
        &self.thresholds
    }

    /// Run every check and return alerts in check order.
    ///
    /// An unknown user yields no alerts. Store failures skip only the
    /// check that needed the failed read.
    pub async fn detect_fraud(
        &self,
        user_id: &str,
        amount: f64,
        recipient: Option<&str>,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let balance = match self.read(self.store.get_balance(user_id)).await {
            Ok(balance) => Some(balance),
            Err(Error::AccountNotFound(_)) => {
                tracing::debug!(user_id = %user_id, "Risk check for unknown account");
                return alerts;
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Balance unavailable, skipping share check");
                None
            }
        };

        alerts.extend(check_transaction_size(&self.thresholds, amount, balance));

        if let Some(alert) = self.velocity(user_id).await {
            alerts.push(alert);
        }

        if let Some(recipient) = recipient.map(str::trim).filter(|r| !r.is_empty()) {
            if let Some(alert) = self.novelty(user_id, recipient, amount).await {
                alerts.push(alert);
            }
        }

        for alert in &alerts {
            metrics::counter!(
                "voice_banking_fraud_alerts_total",
                "alert_type" => alert.alert_type.as_str()
            )
            .increment(1);
        }

        if !alerts.is_empty() {
            tracing::info!(
                user_id = %user_id,
                amount,
                alert_count = alerts.len(),
                "Risk alerts raised"
            );
        }

        alerts
    }

    async fn velocity(&self, user_id: &str) -> Option<Alert> {
        let window = chrono::Duration::minutes(self.thresholds.rapid_window_minutes as i64);
        let query = HistoryQuery::recent_debits(Utc::now() - window);

        match self.read(self.store.count_completed(user_id, &query)).await {
            Ok(count) => check_rapid_transactions(&self.thresholds, count),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "History unavailable, skipping velocity check");
                None
            }
        }
    }

    async fn novelty(&self, user_id: &str, recipient: &str, amount: f64) -> Option<Alert> {
        // nothing to look up below the threshold
        if amount <= self.thresholds.new_recipient_amount {
            return None;
        }

        let query = HistoryQuery::to_recipient(recipient);
        match self.read(self.store.count_completed(user_id, &query)).await {
            Ok(previous) => check_new_recipient(&self.thresholds, recipient, amount, previous),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "History unavailable, skipping recipient check");
                None
            }
        }
    }

    async fn read<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.thresholds.store_timeout, fut)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "account store read exceeded {}ms",
                    self.thresholds.store_timeout.as_millis()
                ))
            })?
    }
}

impl std::fmt::Debug for RiskScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskScorer")
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use parking_lot::Mutex;
    use voice_banking_core::{
        AlertType, Severity, TransactionKind, TransactionRecord, TransactionStatus,
    };

    #[derive(Default)]
    struct FakeStore {
        balance: Option<f64>,
        history: Mutex<Vec<TransactionRecord>>,
        fail_history: bool,
        delay: Option<Duration>,
    }

    impl FakeStore {
        fn with_balance(balance: f64) -> Self {
            Self {
                balance: Some(balance),
                ..Default::default()
            }
        }

        fn push(&self, kind: TransactionKind, recipient: &str, at: DateTime<Utc>) {
            let mut history = self.history.lock();
            let id = format!("txn-{}", history.len() + 1);
            history.push(TransactionRecord {
                id,
                user_id: "u1".to_string(),
                kind,
                status: TransactionStatus::Completed,
                amount: 100.0,
                recipient_name: Some(recipient.to_string()),
                recipient_account: None,
                category: None,
                description: None,
                created_at: at,
            });
        }
    }

    #[async_trait]
    impl AccountStore for FakeStore {
        async fn get_balance(&self, user_id: &str) -> Result<f64> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.balance
                .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))
        }

        async fn count_completed(&self, _user_id: &str, query: &HistoryQuery) -> Result<usize> {
            if self.fail_history {
                return Err(Error::Storage("connection reset".to_string()));
            }
            Ok(self.history.lock().iter().filter(|r| query.matches(r)).count())
        }
    }

    fn scorer(store: FakeStore) -> RiskScorer {
        RiskScorer::new(Arc::new(store), FraudThresholds::default())
    }

    #[tokio::test]
    async fn test_large_transaction_with_small_balance() {
        let scorer = scorer(FakeStore::with_balance(10_000.0));
        let alerts = scorer.detect_fraud("u1", 60_000.0, None).await;

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LargeTransaction);
        assert_eq!(alerts[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_velocity_reports_next_count() {
        let store = FakeStore::with_balance(100_000.0);
        for minutes in 1..=5 {
            store.push(
                TransactionKind::Transfer,
                "Ravi",
                Utc::now() - chrono::Duration::minutes(minutes),
            );
        }
        // outside the window
        store.push(
            TransactionKind::Transfer,
            "Ravi",
            Utc::now() - chrono::Duration::minutes(30),
        );

        let alerts = scorer(store).detect_fraud("u1", 100.0, Some("Ravi")).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::RapidTransactions);
        assert_eq!(alerts[0].message, "6 transactions in last 10 minutes");
    }

    #[tokio::test]
    async fn test_deposits_do_not_count_towards_velocity() {
        let store = FakeStore::with_balance(100_000.0);
        for _ in 0..6 {
            store.push(TransactionKind::Deposit, "Employer", Utc::now());
        }
        let alerts = scorer(store).detect_fraud("u1", 100.0, None).await;
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_all_checks_in_order() {
        let store = FakeStore::with_balance(20_000.0);
        for _ in 0..5 {
            store.push(TransactionKind::Payment, "Electricity Board", Utc::now());
        }

        let alerts = scorer(store).detect_fraud("u1", 15_000.0, Some("Akash")).await;
        let kinds: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            kinds,
            vec![
                AlertType::HighPercentageTransaction,
                AlertType::RapidTransactions,
                AlertType::NewRecipientLargeAmount,
            ]
        );
        assert_eq!(alerts[0].message, "Transaction is 75.0% of your balance");
    }

    #[tokio::test]
    async fn test_known_recipient_not_flagged() {
        let store = FakeStore::with_balance(100_000.0);
        store.push(
            TransactionKind::Transfer,
            "Akash",
            Utc::now() - chrono::Duration::days(3),
        );
        let alerts = scorer(store).detect_fraud("u1", 15_000.0, Some("Akash")).await;
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_alerts() {
        let alerts = scorer(FakeStore::default())
            .detect_fraud("ghost", 90_000.0, Some("Akash"))
            .await;
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_skips_history_checks() {
        let store = FakeStore {
            balance: Some(1_000.0),
            fail_history: true,
            ..Default::default()
        };
        let alerts = scorer(store).detect_fraud("u1", 20_000.0, Some("Akash")).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighPercentageTransaction);
    }

    #[tokio::test]
    async fn test_slow_balance_read_keeps_absolute_check() {
        let store = FakeStore {
            balance: Some(1_000.0),
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let thresholds = FraudThresholds {
            store_timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let scorer = RiskScorer::new(Arc::new(store), thresholds);

        let small = scorer.detect_fraud("u1", 900.0, None).await;
        assert!(small.is_empty());

        let large = scorer.detect_fraud("u1", 75_000.0, None).await;
        assert_eq!(large.len(), 1);
        assert_eq!(large[0].alert_type, AlertType::LargeTransaction);
    }
}
