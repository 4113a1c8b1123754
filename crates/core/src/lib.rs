//! Core traits and types for the voice banking assistant
//!
//! This crate provides foundational types used across all other crates:
//! - The fixed intent vocabulary and classification results
//! - Extracted entities and the action descriptors handed to the transport
//! - Risk alerts produced by the fraud engine
//! - Transaction records and history queries
//! - Collaborator traits (account store, OTP verification, transfers, insights)
//! - Error types

pub mod action;
pub mod alert;
pub mod entities;
pub mod error;
pub mod intent;
pub mod money;
pub mod traits;
pub mod transaction;

pub use action::{ActionDescriptor, BankingAction, Clarification, ClarificationKind};
pub use alert::{Alert, AlertType, Severity};
pub use entities::{BillType, CardAction, CardType, Entities, Period};
pub use error::{Error, Result, TransferError};
pub use intent::{Intent, IntentResult};
pub use money::format_inr;
pub use transaction::{HistoryQuery, TransactionKind, TransactionRecord, TransactionStatus};

pub use traits::{
    AccountStore, CategorySpending, DigitOtpVerifier, InsightsProvider, Notification,
    OtpVerifier, SpendingSummary, TransferGateway, TransferRequest,
};
