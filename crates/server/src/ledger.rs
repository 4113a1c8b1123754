//! In-memory ledger
//!
//! Seeded demo accounts behind the account store, transfer gateway and
//! insights traits. Everything lives for the life of the process.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use voice_banking_config::DemoConfig;
use voice_banking_core::{
    AccountStore, CategorySpending, DigitOtpVerifier, Error, HistoryQuery, InsightsProvider,
    Notification, OtpVerifier, Period, Result, SpendingSummary, TransactionKind,
    TransactionRecord, TransactionStatus, TransferError, TransferGateway, TransferRequest,
};

#[derive(Debug, Clone)]
struct Account {
    name: String,
    balance: f64,
    transactions: Vec<TransactionRecord>,
    notifications: Vec<Notification>,
}

pub struct InMemoryLedger {
    accounts: DashMap<String, Account>,
    otp: Arc<dyn OtpVerifier>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            otp: Arc::new(DigitOtpVerifier),
        }
    }

    pub fn from_config(config: &DemoConfig) -> Self {
        let ledger = Self::new();
        for account in &config.accounts {
            ledger.open_account(&account.user_id, &account.name, account.balance);
        }
        ledger
    }

    pub fn with_otp_verifier(mut self, otp: Arc<dyn OtpVerifier>) -> Self {
        self.otp = otp;
        self
    }

    /// Open (or reset) an account
    pub fn open_account(&self, user_id: &str, name: &str, balance: f64) {
        self.accounts.insert(
            user_id.to_string(),
            Account {
                name: name.to_string(),
                balance,
                transactions: Vec::new(),
                notifications: Vec::new(),
            },
        );
        tracing::debug!(user_id = %user_id, balance, "Opened ledger account");
    }

    pub fn account_name(&self, user_id: &str) -> Option<String> {
        self.accounts.get(user_id).map(|a| a.name.clone())
    }

    /// Append a completed transaction without touching the balance
    pub fn record(&self, record: TransactionRecord) -> Result<()> {
        let mut account = self.account_mut(&record.user_id)?;
        account.transactions.push(record);
        Ok(())
    }

    pub fn notify(&self, user_id: &str, message: impl Into<String>) -> Result<()> {
        let mut account = self.account_mut(user_id)?;
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        };
        account.notifications.push(notification);
        Ok(())
    }

    pub fn transactions(&self, user_id: &str) -> Result<Vec<TransactionRecord>> {
        self.accounts
            .get(user_id)
            .map(|a| a.transactions.clone())
            .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))
    }

    fn account_mut(
        &self,
        user_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, Account>> {
        self.accounts
            .get_mut(user_id)
            .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))
    }

    /// Completed records inside `period`, ending now
    fn in_period(&self, user_id: &str, period: Period) -> Result<Vec<TransactionRecord>> {
        let since = Utc::now() - period.lookback();
        Ok(self
            .transactions(user_id)?
            .into_iter()
            .filter(|r| r.status == TransactionStatus::Completed && r.created_at >= since)
            .collect())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

fn generated_account_number() -> String {
    format!("ACC{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[async_trait]
impl AccountStore for InMemoryLedger {
    async fn get_balance(&self, user_id: &str) -> Result<f64> {
        self.accounts
            .get(user_id)
            .map(|a| a.balance)
            .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))
    }

    async fn count_completed(&self, user_id: &str, query: &HistoryQuery) -> Result<usize> {
        let account = self
            .accounts
            .get(user_id)
            .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))?;
        Ok(account.transactions.iter().filter(|r| query.matches(r)).count())
    }
}

#[async_trait]
impl TransferGateway for InMemoryLedger {
    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> std::result::Result<TransactionRecord, TransferError> {
        if !self.otp.verify(&request.otp) {
            return Err(TransferError::InvalidOtp);
        }

        let mut account = self.account_mut(&request.user_id)?;
        if request.amount > account.balance {
            return Err(TransferError::InsufficientBalance {
                balance: account.balance,
            });
        }

        account.balance -= request.amount;
        let record = TransactionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            kind: TransactionKind::Transfer,
            status: TransactionStatus::Completed,
            amount: request.amount,
            recipient_name: Some(request.recipient_name.clone()),
            recipient_account: Some(
                request
                    .recipient_account
                    .clone()
                    .unwrap_or_else(generated_account_number),
            ),
            category: Some("transfer".to_string()),
            description: Some(format!("Transfer to {}", request.recipient_name)),
            created_at: Utc::now(),
        };
        account.transactions.push(record.clone());

        Ok(record)
    }
}

#[async_trait]
impl InsightsProvider for InMemoryLedger {
    async fn spending_summary(&self, user_id: &str, period: Period) -> Result<SpendingSummary> {
        let records = self.in_period(user_id, period)?;

        let mut total_spending = 0.0;
        let mut total_income = 0.0;
        let mut by_category: HashMap<String, f64> = HashMap::new();
        for record in &records {
            if record.kind == TransactionKind::Deposit {
                total_income += record.amount;
            } else {
                total_spending += record.amount;
                let category = record.category.clone().unwrap_or_else(|| "other".to_string());
                *by_category.entry(category).or_default() += record.amount;
            }
        }

        let top_category = by_category
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(category, _)| category);

        Ok(SpendingSummary {
            period,
            total_spending,
            total_income,
            savings: total_income - total_spending,
            top_category,
        })
    }

    async fn category_spending(
        &self,
        user_id: &str,
        category: &str,
        period: Period,
    ) -> Result<CategorySpending> {
        let all = category.eq_ignore_ascii_case("all");
        let matching: Vec<_> = self
            .in_period(user_id, period)?
            .into_iter()
            .filter(|r| r.kind != TransactionKind::Deposit)
            .filter(|r| {
                all || r
                    .category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            })
            .collect();

        Ok(CategorySpending {
            category: category.to_string(),
            period,
            amount: matching.iter().map(|r| r.amount).sum(),
            transaction_count: matching.len(),
        })
    }

    async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>> {
        let account = self
            .accounts
            .get(user_id)
            .ok_or_else(|| Error::AccountNotFound(user_id.to_string()))?;
        let mut unread: Vec<_> = account
            .notifications
            .iter()
            .filter(|n| !n.read)
            .cloned()
            .collect();
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(unread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        ledger.open_account("u1", "Asha", 10_000.0);
        ledger
    }

    fn request(amount: f64, otp: &str) -> TransferRequest {
        TransferRequest {
            user_id: "u1".to_string(),
            amount,
            recipient_name: "Akash".to_string(),
            recipient_account: None,
            otp: otp.to_string(),
        }
    }

    fn spend(user_id: &str, kind: TransactionKind, amount: f64, category: &str) -> TransactionRecord {
        TransactionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            status: TransactionStatus::Completed,
            amount,
            recipient_name: None,
            recipient_account: None,
            category: Some(category.to_string()),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_transfer_debits_and_records() {
        let ledger = ledger();
        let record = ledger.execute_transfer(request(2_500.0, "123456")).await.unwrap();

        assert_eq!(record.kind, TransactionKind::Transfer);
        let account = record.recipient_account.unwrap();
        assert!(account.starts_with("ACC"));
        assert_eq!(account.len(), 9);
        assert_eq!(ledger.get_balance("u1").await.unwrap(), 7_500.0);

        let count = ledger
            .count_completed("u1", &HistoryQuery::to_recipient("Akash"))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_bad_otp_checked_before_balance() {
        let ledger = ledger();
        let err = ledger.execute_transfer(request(99_999.0, "12")).await.unwrap_err();
        assert_eq!(err.code(), "invalid_otp");

        let err = ledger.execute_transfer(request(99_999.0, "1234")).await.unwrap_err();
        assert_eq!(err, TransferError::InsufficientBalance { balance: 10_000.0 });
        assert_eq!(ledger.get_balance("u1").await.unwrap(), 10_000.0);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let ledger = ledger();
        let err = ledger.get_balance("ghost").await.unwrap_err();
        assert_eq!(err, Error::AccountNotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_spending_summary_and_category() {
        let ledger = ledger();
        ledger.record(spend("u1", TransactionKind::Payment, 1_200.0, "food")).unwrap();
        ledger.record(spend("u1", TransactionKind::Payment, 300.0, "travel")).unwrap();
        ledger.record(spend("u1", TransactionKind::Deposit, 5_000.0, "salary")).unwrap();

        let summary = ledger.spending_summary("u1", Period::LastMonth).await.unwrap();
        assert_eq!(summary.total_spending, 1_500.0);
        assert_eq!(summary.total_income, 5_000.0);
        assert_eq!(summary.savings, 3_500.0);
        assert_eq!(summary.top_category.as_deref(), Some("food"));

        let food = ledger
            .category_spending("u1", "Food", Period::LastWeek)
            .await
            .unwrap();
        assert_eq!(food.amount, 1_200.0);
        assert_eq!(food.transaction_count, 1);

        let all = ledger.category_spending("u1", "all", Period::Month).await.unwrap();
        assert_eq!(all.amount, 1_500.0);
    }

    #[tokio::test]
    async fn test_notifications_unread_only() {
        let ledger = ledger();
        ledger.notify("u1", "Salary credited").unwrap();
        ledger.notify("u1", "Card used at ATM").unwrap();

        let notifications = ledger.notifications("u1").await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(ledger.notify("ghost", "x").is_err());
    }

    #[test]
    fn test_seeded_from_config() {
        let ledger = InMemoryLedger::from_config(&DemoConfig::default());
        assert_eq!(ledger.account_name("demo").as_deref(), Some("Demo User"));
    }
}
