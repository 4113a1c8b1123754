//! ONNX sequence classifier
//!
//! Expects a directory exported from a fine-tuned text classifier:
//! `model.onnx` with `input_ids`/`attention_mask` inputs and a `logits`
//! output, plus a `tokenizer.json`. Label tables are optional, see
//! [`LabelResolver`].

use std::path::PathBuf;

#[cfg(feature = "onnx")]
use ndarray::Array2;
#[cfg(feature = "onnx")]
use ort::{session::builder::GraphOptimizationLevel, session::Session, value::Tensor};
#[cfg(feature = "onnx")]
use parking_lot::Mutex;
#[cfg(feature = "onnx")]
use tokenizers::Tokenizer;

use voice_banking_config::ClassifierConfig;
use voice_banking_core::IntentResult;

#[cfg(feature = "onnx")]
use super::with_entities;
use super::{IntentClassifier, KeywordClassifier, LabelResolver};
#[cfg(feature = "onnx")]
use crate::EntityExtractor;
use crate::{Result, TextProcessingError};

/// Model classifier configuration
#[derive(Debug, Clone)]
pub struct ModelClassifierConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub intent_mapping_path: Option<PathBuf>,
    pub label_mapping_paths: Vec<PathBuf>,
    pub max_seq_len: usize,
    pub intra_threads: usize,
}

impl From<&ClassifierConfig> for ModelClassifierConfig {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            model_path: config.model_path().unwrap_or_default(),
            tokenizer_path: config.tokenizer_path().unwrap_or_default(),
            intent_mapping_path: config.intent_mapping_path(),
            label_mapping_paths: config.label_mapping_paths(),
            max_seq_len: config.max_seq_len,
            intra_threads: config.intra_threads,
        }
    }
}

pub struct ModelClassifier {
    #[cfg(feature = "onnx")]
    session: Mutex<Session>,
    #[cfg(feature = "onnx")]
    tokenizer: Tokenizer,
    #[cfg(feature = "onnx")]
    extractor: EntityExtractor,
    fallback: KeywordClassifier,
    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    config: ModelClassifierConfig,
    labels: LabelResolver,
}

impl ModelClassifier {
    /// Load the model, tokenizer and label tables
    #[cfg(feature = "onnx")]
    pub fn load(config: ModelClassifierConfig) -> Result<Self> {
        if !config.model_path.is_file() {
            return Err(TextProcessingError::ModelUnavailable(format!(
                "model not found: {}",
                config.model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| TextProcessingError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| TextProcessingError::Tokenizer(e.to_string()))?;

        let labels = LabelResolver::from_files(
            config.intent_mapping_path.as_deref(),
            &config.label_mapping_paths,
        )?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            extractor: EntityExtractor::new(),
            fallback: KeywordClassifier::new(),
            config,
            labels,
        })
    }

    /// Model support is compiled out
    #[cfg(not(feature = "onnx"))]
    pub fn load(_config: ModelClassifierConfig) -> Result<Self> {
        Err(TextProcessingError::ModelUnavailable(
            "built without the onnx feature".to_string(),
        ))
    }

    pub fn label_count(&self) -> usize {
        self.labels.label_count()
    }

    /// Run the model, surfacing any fault
    #[cfg(feature = "onnx")]
    pub fn try_recognize(&self, text: &str) -> Result<IntentResult> {
        let (ids, mask) = self.encode(text)?;
        let logits = self.run(ids, mask)?;

        let probabilities = softmax(&logits);
        let (class, confidence) = argmax(&probabilities)
            .ok_or_else(|| TextProcessingError::Model("Empty logits".to_string()))?;

        let intent = self.labels.resolve(class);
        tracing::trace!(class, intent = %intent, confidence, "Model prediction");

        Ok(with_entities(&self.extractor, text, intent, confidence))
    }

    #[cfg(feature = "onnx")]
    fn encode(&self, text: &str) -> Result<(Array2<i64>, Array2<i64>)> {
        let max_len = self.config.max_seq_len;
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| TextProcessingError::Tokenizer(e.to_string()))?;

        let ids: Vec<i64> = encoding
            .get_ids()
            .iter()
            .take(max_len)
            .map(|&id| id as i64)
            .collect();

        let mut padded_ids = vec![0i64; max_len];
        let mut padded_mask = vec![0i64; max_len];
        padded_ids[..ids.len()].copy_from_slice(&ids);
        padded_mask[..ids.len()].fill(1);

        let input_ids = Array2::from_shape_vec((1, max_len), padded_ids)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;
        let attention = Array2::from_shape_vec((1, max_len), padded_mask)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;

        Ok((input_ids, attention))
    }

    #[cfg(feature = "onnx")]
    fn run(&self, input_ids: Array2<i64>, attention_mask: Array2<i64>) -> Result<Vec<f32>> {
        let input_ids =
            Tensor::from_array(input_ids).map_err(|e| TextProcessingError::Model(e.to_string()))?;
        let attention_mask = Tensor::from_array(attention_mask)
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
            ])
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;

        let (_shape, logits) = outputs
            .get("logits")
            .ok_or_else(|| TextProcessingError::Model("Missing logits output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| TextProcessingError::Model(e.to_string()))?;

        // batch of one: the whole buffer is the class row
        Ok(logits.to_vec())
    }
}

impl IntentClassifier for ModelClassifier {
    #[cfg(not(feature = "onnx"))]
    fn recognize(&self, text: &str) -> IntentResult {
        self.fallback.recognize(text)
    }

    #[cfg(feature = "onnx")]
    fn recognize(&self, text: &str) -> IntentResult {
        match self.try_recognize(text) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Intent model failed, using keyword rules");
                metrics::counter!("voice_banking_classifier_fallbacks_total", "reason" => "error")
                    .increment(1);
                self.fallback.recognize(text)
            }
        }
    }

    fn name(&self) -> &'static str {
        "onnx"
    }

    fn is_statistical(&self) -> bool {
        true
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.iter().map(|&e| e / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

/// Index and value of the largest probability
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}
