//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{classifier, demo, fraud, sessions};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP/WebSocket server
    #[serde(default)]
    pub server: ServerConfig,

    /// Intent classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Risk scoring thresholds
    #[serde(default)]
    pub fraud: FraudConfig,

    /// Dialogue session registry
    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Seeded in-memory accounts
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_classifier()?;
        self.validate_fraud()?;
        self.validate_sessions()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let cls = &self.classifier;

        if cls.max_seq_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "classifier.max_seq_len".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if cls.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "classifier.timeout_ms".to_string(),
                message: "Must be at least 1ms".to_string(),
            });
        }

        if let Some(dir) = &cls.model_dir {
            if !Path::new(dir).is_dir() {
                if self.environment.is_strict() {
                    return Err(ConfigError::InvalidValue {
                        field: "classifier.model_dir".to_string(),
                        message: format!("Model directory not found: {}", dir),
                    });
                }
                tracing::warn!(
                    model_dir = %dir,
                    "Classifier model directory not found, keyword classifier will be used"
                );
            }
        }

        Ok(())
    }

    fn validate_fraud(&self) -> Result<(), ConfigError> {
        let f = &self.fraud;

        if f.balance_ratio_threshold <= 0.0 || f.balance_ratio_threshold > 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "fraud.balance_ratio_threshold".to_string(),
                message: format!(
                    "Must be in (0.0, 1.0], got {}",
                    f.balance_ratio_threshold
                ),
            });
        }

        let amounts = [
            (
                "fraud.large_transaction_threshold",
                f.large_transaction_threshold,
            ),
            (
                "fraud.new_recipient_amount_threshold",
                f.new_recipient_amount_threshold,
            ),
        ];
        for (field, value) in amounts {
            if value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be positive, got {}", value),
                });
            }
        }

        if f.rapid_transaction_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fraud.rapid_transaction_count".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if f.rapid_window_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fraud.rapid_window_minutes".to_string(),
                message: "Must be at least 1 minute".to_string(),
            });
        }

        if f.store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fraud.store_timeout_ms".to_string(),
                message: "Must be at least 1ms".to_string(),
            });
        }

        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        let s = &self.sessions;

        if s.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if s.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.cleanup_interval_secs".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        if s.idle_timeout_secs < s.cleanup_interval_secs {
            tracing::warn!(
                "sessions.idle_timeout_secs ({}) is shorter than cleanup_interval_secs ({}), \
                 idle sessions will outlive their timeout until the next sweep",
                s.idle_timeout_secs,
                s.cleanup_interval_secs
            );
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Intent classifier configuration
///
/// When `model_dir` points at an exported sequence classifier the ONNX
/// strategy is used; otherwise the keyword strategy serves every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Directory holding `model.onnx`, `tokenizer.json` and optional mapping files
    #[serde(default)]
    pub model_dir: Option<String>,

    /// Maximum token sequence length fed to the model
    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,

    /// Inference budget before falling back to keywords
    #[serde(default = "default_classifier_timeout")]
    pub timeout_ms: u64,

    /// ONNX Runtime intra-op threads
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

fn default_max_seq_len() -> usize {
    classifier::MAX_SEQ_LEN
}
fn default_classifier_timeout() -> u64 {
    classifier::TIMEOUT_MS
}
fn default_intra_threads() -> usize {
    classifier::INTRA_THREADS
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            max_seq_len: default_max_seq_len(),
            timeout_ms: default_classifier_timeout(),
            intra_threads: default_intra_threads(),
        }
    }
}

impl ClassifierConfig {
    fn model_file(&self, name: &str) -> Option<PathBuf> {
        self.model_dir.as_ref().map(|dir| Path::new(dir).join(name))
    }

    pub fn model_path(&self) -> Option<PathBuf> {
        self.model_file(classifier::MODEL_FILE)
    }

    pub fn tokenizer_path(&self) -> Option<PathBuf> {
        self.model_file(classifier::TOKENIZER_FILE)
    }

    pub fn intent_mapping_path(&self) -> Option<PathBuf> {
        self.model_file(classifier::INTENT_MAPPING_FILE)
    }

    /// Label table sits in the model directory or next to it
    pub fn label_mapping_paths(&self) -> Vec<PathBuf> {
        let Some(dir) = &self.model_dir else {
            return Vec::new();
        };
        let dir = Path::new(dir);
        let mut paths = vec![dir.join(classifier::LABEL_MAPPING_FILE)];
        if let Some(parent) = dir.parent() {
            paths.push(parent.join(classifier::LABEL_MAPPING_FILE));
        }
        paths
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Risk scoring thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    #[serde(default = "default_large_threshold")]
    pub large_transaction_threshold: f64,

    #[serde(default = "default_balance_ratio")]
    pub balance_ratio_threshold: f64,

    #[serde(default = "default_rapid_count")]
    pub rapid_transaction_count: usize,

    #[serde(default = "default_rapid_window")]
    pub rapid_window_minutes: u64,

    #[serde(default = "default_new_recipient_threshold")]
    pub new_recipient_amount_threshold: f64,

    /// Budget for each account store read
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

fn default_large_threshold() -> f64 {
    fraud::LARGE_TRANSACTION_THRESHOLD
}
fn default_balance_ratio() -> f64 {
    fraud::BALANCE_RATIO_THRESHOLD
}
fn default_rapid_count() -> usize {
    fraud::RAPID_TRANSACTION_COUNT
}
fn default_rapid_window() -> u64 {
    fraud::RAPID_WINDOW_MINUTES
}
fn default_new_recipient_threshold() -> f64 {
    fraud::NEW_RECIPIENT_AMOUNT_THRESHOLD
}
fn default_store_timeout() -> u64 {
    fraud::STORE_TIMEOUT_MS
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            large_transaction_threshold: default_large_threshold(),
            balance_ratio_threshold: default_balance_ratio(),
            rapid_transaction_count: default_rapid_count(),
            rapid_window_minutes: default_rapid_window(),
            new_recipient_amount_threshold: default_new_recipient_threshold(),
            store_timeout_ms: default_store_timeout(),
        }
    }
}

/// Dialogue session registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is swept
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_max_sessions() -> usize {
    sessions::MAX_SESSIONS
}
fn default_idle_timeout() -> u64 {
    sessions::IDLE_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    sessions::CLEANUP_INTERVAL_SECS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoAccount {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_demo_accounts")]
    pub accounts: Vec<DemoAccount>,
}

fn default_demo_accounts() -> Vec<DemoAccount> {
    vec![DemoAccount {
        user_id: demo::USER_ID.to_string(),
        name: demo::NAME.to_string(),
        balance: demo::BALANCE,
    }]
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            accounts: default_demo_accounts(),
        }
    }
}

/// Load settings from `config/` and the environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Load settings from a config directory.
///
/// Priority: env vars > `{dir}/{env}.*` > `{dir}/default.*` > defaults
pub fn load_settings_from(
    config_dir: impl AsRef<Path>,
    env: Option<&str>,
) -> Result<Settings, ConfigError> {
    let dir = config_dir.as_ref();
    let mut builder = Config::builder();

    // Load default config
    let default_name = dir.join("default");
    builder = builder.add_source(File::with_name(&default_name.to_string_lossy()).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        let env_file = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_file.to_string_lossy()).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_BANKING")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.fraud.large_transaction_threshold, 50_000.0);
        assert_eq!(settings.fraud.rapid_transaction_count, 5);
        assert_eq!(settings.demo.accounts.len(), 1);
        assert!(settings.classifier.model_dir.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_fraud_validation() {
        let mut settings = Settings::default();
        settings.fraud.balance_ratio_threshold = 1.5;
        assert!(settings.validate_fraud().is_err());

        settings.fraud.balance_ratio_threshold = 0.5;
        settings.fraud.large_transaction_threshold = 0.0;
        assert!(settings.validate_fraud().is_err());

        settings.fraud.large_transaction_threshold = 50_000.0;
        settings.fraud.rapid_window_minutes = 0;
        assert!(settings.validate_fraud().is_err());
    }

    #[test]
    fn test_session_and_server_validation() {
        let mut settings = Settings::default();
        settings.sessions.max_sessions = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.server.port = 0;
        match settings.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "server.port"),
            other => panic!("expected invalid port, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_model_dir_strict_only() {
        let mut settings = Settings::default();
        settings.classifier.model_dir = Some("/definitely/not/here".to_string());
        assert!(settings.validate_classifier().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate_classifier().is_err());
    }

    #[test]
    fn test_classifier_paths() {
        let cls = ClassifierConfig {
            model_dir: Some("models/banking77-intent".to_string()),
            ..Default::default()
        };
        assert_eq!(
            cls.model_path(),
            Some(PathBuf::from("models/banking77-intent/model.onnx"))
        );
        assert_eq!(
            cls.label_mapping_paths(),
            vec![
                PathBuf::from("models/banking77-intent/label_mapping.json"),
                PathBuf::from("models/label_mapping.json"),
            ]
        );
        assert!(ClassifierConfig::default().tokenizer_path().is_none());
    }

    #[test]
    fn test_layered_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[fraud]\nlarge_transaction_threshold = 60000.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "environment = \"staging\"\n\n[fraud]\nlarge_transaction_threshold = 75000.0\n",
        )
        .unwrap();

        let base = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(base.server.port, 9000);
        assert_eq!(base.fraud.large_transaction_threshold, 60_000.0);
        assert_eq!(base.environment, RuntimeEnvironment::Development);

        let staging = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(staging.server.port, 9000);
        assert_eq!(staging.fraud.large_transaction_threshold, 75_000.0);
        assert_eq!(staging.environment, RuntimeEnvironment::Staging);
        assert_eq!(staging.fraud.rapid_transaction_count, 5);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[sessions]\nmax_sessions = 0\n",
        )
        .unwrap();

        assert!(matches!(
            load_settings_from(dir.path(), None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
