//! Configuration management for the voice banking assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (VOICE_BANKING__ prefix, `__` separator)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, ClassifierConfig, DemoAccount, DemoConfig, FraudConfig,
    ObservabilityConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
