//! Error types for text processing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Label mapping error: {0}")]
    LabelMapping(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TextProcessingError>;
