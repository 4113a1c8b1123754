//! Async classification with a bounded inference budget

use std::sync::Arc;
use std::time::Duration;

use voice_banking_config::constants::classifier::TIMEOUT_MS;
use voice_banking_config::ClassifierConfig;
use voice_banking_core::IntentResult;

use super::{build_classifier, IntentClassifier, KeywordClassifier};

/// Front door for classification on the async runtime.
///
/// Statistical classifiers run on the blocking pool under a timeout; a
/// timeout or a panicked task falls back to keyword rules, so `recognize`
/// always produces a result.
#[derive(Clone)]
pub struct IntentService {
    classifier: Arc<dyn IntentClassifier>,
    fallback: KeywordClassifier,
    timeout: Duration,
}

impl IntentService {
    pub fn new(classifier: Arc<dyn IntentClassifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            fallback: KeywordClassifier::new(),
            timeout,
        }
    }

    /// Probe for a model and wrap whichever strategy loads
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(build_classifier(config), config.timeout())
    }

    /// Keyword rules only
    pub fn keyword() -> Self {
        Self::new(Arc::new(KeywordClassifier::new()), Duration::from_millis(TIMEOUT_MS))
    }

    pub fn strategy(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn classifier(&self) -> Arc<dyn IntentClassifier> {
        Arc::clone(&self.classifier)
    }

    pub async fn recognize(&self, text: &str) -> IntentResult {
        if !self.classifier.is_statistical() {
            return self.classifier.recognize(text);
        }

        let classifier = Arc::clone(&self.classifier);
        let owned = text.to_string();
        let task = tokio::task::spawn_blocking(move || classifier.recognize(&owned));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Classifier task failed, using keyword rules");
                self.fall_back(text, "panic")
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    strategy = self.classifier.name(),
                    "Classifier timed out, using keyword rules"
                );
                self.fall_back(text, "timeout")
            }
        }
    }

    fn fall_back(&self, text: &str, reason: &'static str) -> IntentResult {
        metrics::counter!("voice_banking_classifier_fallbacks_total", "reason" => reason)
            .increment(1);
        self.fallback.recognize(text)
    }
}

impl std::fmt::Debug for IntentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentService")
            .field("strategy", &self.classifier.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
