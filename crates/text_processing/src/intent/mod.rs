//! Intent classification
//!
//! Two strategies share the [`IntentClassifier`] interface:
//!
//! - [`KeywordClassifier`]: ordered keyword rules, always available
//! - [`ModelClassifier`]: ONNX sequence classifier (`onnx` feature)
//!
//! [`build_classifier`] probes for a loadable model once at startup and
//! returns whichever strategy is usable. Callers never see which one they
//! got beyond [`IntentClassifier::name`].

mod keywords;
mod labels;
mod model;
mod service;

use std::sync::Arc;

use voice_banking_config::ClassifierConfig;
use voice_banking_core::{Intent, IntentResult};

use crate::EntityExtractor;

pub use keywords::KeywordClassifier;
pub use labels::{infer_from_label, LabelResolver};
pub use model::{ModelClassifier, ModelClassifierConfig};
pub use service::IntentService;

/// Maps utterance text to an intent, confidence and entities.
///
/// `recognize` is infallible: implementations handle their own faults and
/// return a usable result.
pub trait IntentClassifier: Send + Sync + 'static {
    fn recognize(&self, text: &str) -> IntentResult;

    /// Strategy name for logs and health output
    fn name(&self) -> &'static str;

    /// Whether `recognize` may block on model inference
    fn is_statistical(&self) -> bool {
        false
    }
}

/// Build the classifier for this process.
///
/// Uses the model when `model_dir` is set and loads; otherwise keywords.
pub fn build_classifier(config: &ClassifierConfig) -> Arc<dyn IntentClassifier> {
    if config.model_dir.is_none() {
        tracing::info!("No classifier model configured, using keyword classifier");
        return Arc::new(KeywordClassifier::new());
    }

    match ModelClassifier::load(ModelClassifierConfig::from(config)) {
        Ok(model) => {
            tracing::info!(
                model_dir = ?config.model_dir,
                labels = model.label_count(),
                "Loaded intent model"
            );
            Arc::new(model)
        }
        Err(e) => {
            tracing::warn!(
                model_dir = ?config.model_dir,
                error = %e,
                "Intent model unavailable, using keyword classifier"
            );
            Arc::new(KeywordClassifier::new())
        }
    }
}

/// Attach intent-conditioned entities to a resolved intent
pub(crate) fn with_entities(
    extractor: &EntityExtractor,
    text: &str,
    intent: Intent,
    confidence: f32,
) -> IntentResult {
    IntentResult::new(intent, confidence, extractor.extract(text, intent))
}
