//! Centralized constants for the voice banking assistant
//!
//! Single source of truth for business thresholds and the fixed figures
//! quoted by informational replies. Settings defaults read from here.

/// Risk scoring thresholds
pub mod fraud {
    /// Amount above which a transfer is always flagged (INR)
    pub const LARGE_TRANSACTION_THRESHOLD: f64 = 50_000.0;

    /// Share of the balance above which a transfer is flagged
    pub const BALANCE_RATIO_THRESHOLD: f64 = 0.5;

    /// Completed debits in the window that trigger the velocity alert
    pub const RAPID_TRANSACTION_COUNT: usize = 5;

    /// Velocity window
    pub const RAPID_WINDOW_MINUTES: u64 = 10;

    /// Amount above which a first transfer to a recipient is flagged (INR)
    pub const NEW_RECIPIENT_AMOUNT_THRESHOLD: f64 = 10_000.0;

    /// Per-call budget for account store reads
    pub const STORE_TIMEOUT_MS: u64 = 500;
}

/// Intent classifier defaults
pub mod classifier {
    pub const MAX_SEQ_LEN: usize = 128;
    pub const TIMEOUT_MS: u64 = 300;
    pub const INTRA_THREADS: usize = 2;

    pub const MODEL_FILE: &str = "model.onnx";
    pub const TOKENIZER_FILE: &str = "tokenizer.json";
    pub const INTENT_MAPPING_FILE: &str = "intent_mapping.json";
    pub const LABEL_MAPPING_FILE: &str = "label_mapping.json";
}

/// Session registry defaults
pub mod sessions {
    pub const MAX_SESSIONS: usize = 1000;
    pub const IDLE_TIMEOUT_SECS: u64 = 1800;
    pub const CLEANUP_INTERVAL_SECS: u64 = 60;
}

/// Seeded demo account
pub mod demo {
    pub const USER_ID: &str = "demo";
    pub const NAME: &str = "Demo User";
    pub const BALANCE: f64 = 100_000.0;
}
