//! Error types shared by collaborator traits

use thiserror::Error;

/// Collaborator error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejection from the transfer collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Insufficient balance")]
    InsufficientBalance { balance: f64 },

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error(transparent)]
    Store(#[from] Error),
}

impl TransferError {
    /// Stable machine-readable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InsufficientBalance { .. } => "insufficient_balance",
            TransferError::InvalidOtp => "invalid_otp",
            TransferError::Store(_) => "storage_error",
        }
    }
}
