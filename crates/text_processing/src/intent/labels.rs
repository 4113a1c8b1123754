//! Model class index to application intent
//!
//! Resolution is an ordered chain, cheapest first:
//! 1. class index -> label text (`label_mapping.json`)
//! 2. label text -> app intent (`intent_mapping.json`, `banking77_to_app`)
//! 3. label text -> app intent by keyword inference
//!
//! Without a label table the index addresses [`Intent::ALL`] directly.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use voice_banking_core::Intent;

use crate::{Result, TextProcessingError};

#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    labels: HashMap<usize, String>,
    app_intents: HashMap<String, Intent>,
}

impl LabelResolver {
    pub fn new(labels: HashMap<usize, String>, app_intents: HashMap<String, Intent>) -> Self {
        Self {
            labels,
            app_intents,
        }
    }

    /// Load mapping files. Missing files are skipped; malformed ones are errors.
    ///
    /// The first existing path in `label_paths` is used.
    pub fn from_files(intent_mapping: Option<&Path>, label_paths: &[PathBuf]) -> Result<Self> {
        let app_intents = match intent_mapping.filter(|p| p.is_file()) {
            Some(path) => parse_intent_mapping(&fs::read_to_string(path)?)?,
            None => HashMap::new(),
        };

        let labels = match label_paths.iter().find(|p| p.is_file()) {
            Some(path) => parse_label_mapping(&fs::read_to_string(path)?)?,
            None => HashMap::new(),
        };

        tracing::debug!(
            labels = labels.len(),
            mappings = app_intents.len(),
            "Loaded label tables"
        );

        Ok(Self::new(labels, app_intents))
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn label_text(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn resolve(&self, index: usize) -> Intent {
        match self.label_text(index) {
            Some(label) => self
                .explicit(label)
                .unwrap_or_else(|| infer_from_label(label)),
            None => Intent::from_index(index).unwrap_or(Intent::Other),
        }
    }

    fn explicit(&self, label: &str) -> Option<Intent> {
        self.app_intents.get(label).copied()
    }
}

/// Substring checks over a normalised label, in priority order
pub fn infer_from_label(label: &str) -> Intent {
    let label = label.to_lowercase().replace([' ', '-'], "_");
    let has = |needle: &str| label.contains(needle);

    if has("balance") {
        Intent::CheckBalance
    } else if has("transfer") {
        Intent::TransferFunds
    } else if has("transaction") || has("history") {
        Intent::ViewTransactions
    } else if has("loan") {
        Intent::LoanInquiry
    } else if has("interest") {
        Intent::InterestInquiry
    } else if has("credit") || has("card") {
        if has("limit") {
            Intent::CreditLimitInquiry
        } else {
            Intent::ManageCard
        }
    } else if has("payment") || has("bill") {
        Intent::PaymentAlert
    } else if has("spend") || has("expense") {
        Intent::SpendingSummary
    } else if has("notification") || has("alert") {
        Intent::ViewNotifications
    } else if has("reminder") {
        Intent::SetReminder
    } else if has("greeting") || has("hello") {
        Intent::Greeting
    } else if has("goodbye") || has("bye") {
        Intent::Goodbye
    } else {
        Intent::Other
    }
}

/// Accepts `{"0": "label", ...}` or `["label", ...]`
fn parse_label_mapping(raw: &str) -> Result<HashMap<usize, String>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| TextProcessingError::LabelMapping(e.to_string()))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| label_string(v).map(|s| (i, s)))
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let index = k.trim().parse::<usize>().map_err(|_| {
                    TextProcessingError::LabelMapping(format!("non-numeric label index: {}", k))
                })?;
                label_string(v).map(|s| (index, s))
            })
            .collect(),
        _ => Err(TextProcessingError::LabelMapping(
            "expected an object or array of labels".to_string(),
        )),
    }
}

fn label_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(TextProcessingError::LabelMapping(format!(
            "label must be a string, got {}",
            other
        ))),
    }
}

/// Reads `banking77_to_app`. Unknown app intents are skipped.
fn parse_intent_mapping(raw: &str) -> Result<HashMap<String, Intent>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| TextProcessingError::LabelMapping(e.to_string()))?;

    let Some(table) = value.get("banking77_to_app").and_then(Value::as_object) else {
        return Ok(HashMap::new());
    };

    let mut mapping = HashMap::with_capacity(table.len());
    for (label, target) in table {
        match target.as_str().map(str::parse::<Intent>) {
            Some(Ok(intent)) => {
                mapping.insert(label.clone(), intent);
            }
            _ => tracing::warn!(label = %label, app_intent = %target, "Skipping unknown app intent"),
        }
    }
    Ok(mapping)
}
