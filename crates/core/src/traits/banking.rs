//! Banking collaborator traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{HistoryQuery, Result, TransactionRecord, TransferError};

/// Read-only account queries
///
/// Implementations:
/// - `InMemoryLedger` - seeded demo ledger in the server crate
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Current balance of the user's account
    async fn get_balance(&self, user_id: &str) -> Result<f64>;

    /// Count the user's completed transactions matching `query`
    async fn count_completed(&self, user_id: &str, query: &HistoryQuery) -> Result<usize>;
}

/// One-time password predicate
pub trait OtpVerifier: Send + Sync + 'static {
    fn verify(&self, code: &str) -> bool;
}

/// Accepts any all-digit code of 4 to 6 characters.
///
/// Demo grade: there is no expiry and no comparison with a sent code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitOtpVerifier;

impl DigitOtpVerifier {
    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 6;
}

impl OtpVerifier for DigitOtpVerifier {
    fn verify(&self, code: &str) -> bool {
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_digit())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub user_id: String,
    pub amount: f64,
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_account: Option<String>,
    pub otp: String,
}

/// Moves funds once the dialogue has produced an OTP-bearing transfer
#[async_trait]
pub trait TransferGateway: Send + Sync + 'static {
    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> std::result::Result<TransactionRecord, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_otp_verifier() {
        let verifier = DigitOtpVerifier;
        assert!(verifier.verify("1234"));
        assert!(verifier.verify("123456"));
        assert!(!verifier.verify("123"));
        assert!(!verifier.verify("1234567"));
        assert!(!verifier.verify("12a4"));
        assert!(!verifier.verify(""));
    }
}
