//! Collaborator traits consumed by the assistant
//!
//! ```text
//! Banking:
//!   - AccountStore: read-only balance and history queries
//!   - OtpVerifier: one-time password predicate
//!   - TransferGateway: executes a confirmed, OTP-gated transfer
//!
//! Insights:
//!   - InsightsProvider: spending arithmetic and notifications
//! ```

mod banking;
mod insights;

pub use banking::{AccountStore, DigitOtpVerifier, OtpVerifier, TransferGateway, TransferRequest};
pub use insights::{CategorySpending, InsightsProvider, Notification, SpendingSummary};
