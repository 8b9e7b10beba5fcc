//! Configuration management for the concierge assistant
//!
//! Supports loading configuration from:
//! - TOML/YAML/JSON files under `config/` (`default`, then `{env}`)
//! - Environment variables (`CONCIERGE__` prefix, `__` separator)
//!
//! A few values default from the variables the deployment already uses:
//! `GOOGLE_SHEET_NAME` and `SMTP_*`.

pub mod settings;

pub use settings::{
    load_settings, load_settings_from, BookingSettings, EmbedderKind, LlmSettings,
    NotificationSettings, ObservabilityConfig, RagSettings, RuntimeEnvironment, SenderKind,
    ServerConfig, Settings, SinkKind,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
