//! Risk scoring for proposed transfers
//!
//! Three independent checks run on every call, in this order:
//! - **Threshold**: absolute size, then share of the current balance
//! - **Velocity**: completed debits in the trailing window
//! - **Novelty**: first transfer to a recipient with a large amount
//!
//! Alerts are advisory. The scorer never fails: a collaborator error or
//! timeout skips the affected check with a warning.

mod checks;
mod scorer;

pub use checks::{check_new_recipient, check_rapid_transactions, check_transaction_size};
pub use scorer::{FraudThresholds, RiskScorer};
