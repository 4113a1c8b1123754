//! Spending and notification queries
//!
//! The dialogue engine only names these queries in its action descriptors;
//! the transport runs them and rewrites the placeholder response.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Period, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub period: Period,
    pub total_spending: f64,
    pub total_income: f64,
    pub savings: f64,
    pub top_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    pub period: Period,
    pub amount: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait InsightsProvider: Send + Sync + 'static {
    async fn spending_summary(&self, user_id: &str, period: Period) -> Result<SpendingSummary>;

    /// `category` of `all` covers every category
    async fn category_spending(
        &self,
        user_id: &str,
        category: &str,
        period: Period,
    ) -> Result<CategorySpending>;

    /// Unread notifications, newest first
    async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>>;
}
