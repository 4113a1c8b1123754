//! Text processing for the voice banking assistant
//!
//! This crate turns free-form utterances into structured input for the
//! dialogue engine:
//! - **Entity Extraction**: amounts, recipients, categories, periods, bills, cards
//! - **Intent Classification**: keyword rules or an ONNX sequence classifier
//!   behind one `IntentClassifier` interface
//! - **Intent Service**: async, time-bounded classification with keyword fallback
//! - **Similarity**: fuzzy matching for correction suggestions
//!
//! # Example
//!
//! ```
//! use voice_banking_core::Intent;
//! use voice_banking_text_processing::{IntentClassifier, KeywordClassifier};
//!
//! let classifier = KeywordClassifier::new();
//! let result = classifier.recognize("transfer ₹5,000 to Akash");
//!
//! assert_eq!(result.intent, Intent::TransferFunds);
//! assert_eq!(result.entities.amount, Some(5000.0));
//! ```

pub mod entities;
pub mod intent;
pub mod similarity;

mod error;

pub use error::{Result, TextProcessingError};

pub use entities::EntityExtractor;
pub use intent::{
    build_classifier, IntentClassifier, IntentService, KeywordClassifier, LabelResolver,
    ModelClassifier, ModelClassifierConfig,
};
pub use similarity::{closest_match, ratio};
