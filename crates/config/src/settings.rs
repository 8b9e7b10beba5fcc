//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub rag: RagSettings,

    #[serde(default)]
    pub booking: BookingSettings,

    #[serde(default)]
    pub notification: NotificationSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_rag()?;
        self.validate_booking()?;
        self.validate_notification()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }

        if llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }

        if llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "Must be greater than 0"));
        }

        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(invalid("rag.chunk_size", "Must be greater than 0"));
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(invalid(
                "rag.chunk_overlap",
                format!(
                    "Must be smaller than chunk_size ({}), got {}",
                    rag.chunk_size, rag.chunk_overlap
                ),
            ));
        }

        if rag.top_k == 0 {
            return Err(invalid("rag.top_k", "Must be greater than 0"));
        }

        if rag.embedding_dim == 0 {
            return Err(invalid("rag.embedding_dim", "Must be greater than 0"));
        }

        Ok(())
    }

    fn validate_booking(&self) -> Result<(), ConfigError> {
        if self.booking.sink == SinkKind::Sheet && is_blank(&self.booking.sheet_endpoint) {
            return Err(ConfigError::MissingField(
                "booking.sheet_endpoint (required when booking.sink = \"sheet\")".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_notification(&self) -> Result<(), ConfigError> {
        if self.notification.sender == SenderKind::Http
            && is_blank(&self.notification.relay_endpoint)
        {
            return Err(ConfigError::MissingField(
                "notification.relay_endpoint (required when notification.sender = \"http\")"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Chat model used for document answers and general reasoning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// `ollama` or `openai`
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_max_tokens() -> usize {
    512
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Hashed bag-of-words, no external service
    #[default]
    Simple,
    Ollama,
}

/// Document chunking and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedder: EmbedderKind,

    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Ollama endpoint for embeddings; falls back to the LLM endpoint
    #[serde(default)]
    pub embedding_endpoint: Option<String>,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    3
}

fn default_embedding_dim() -> usize {
    384
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedder: EmbedderKind::default(),
            embedding_dim: default_embedding_dim(),
            embedding_model: default_embedding_model(),
            embedding_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Memory,
    Sheet,
}

/// Where completed bookings are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSettings {
    #[serde(default)]
    pub sink: SinkKind,

    #[serde(default = "default_sheet_name")]
    pub sheet_name: Option<String>,

    /// Row-append endpoint for the spreadsheet sink
    #[serde(default)]
    pub sheet_endpoint: Option<String>,
}

fn default_sheet_name() -> Option<String> {
    std::env::var("GOOGLE_SHEET_NAME").ok()
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            sheet_name: default_sheet_name(),
            sheet_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    /// Log only
    #[default]
    Simulated,
    Http,
}

/// Confirmation email delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub sender: SenderKind,

    #[serde(default)]
    pub relay_endpoint: Option<String>,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    #[serde(default = "default_sender_password", skip_serializing)]
    pub sender_password: String,
}

fn default_smtp_host() -> String {
    std::env::var("SMTP_HOST").unwrap_or_default()
}

fn default_smtp_port() -> u16 {
    std::env::var("SMTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(587)
}

fn default_sender_email() -> String {
    std::env::var("SMTP_SENDER_EMAIL").unwrap_or_default()
}

fn default_sender_password() -> String {
    std::env::var("SMTP_SENDER_PASSWORD").unwrap_or_default()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sender: SenderKind::default(),
            relay_endpoint: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            sender_email: default_sender_email(),
            sender_password: default_sender_password(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
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

/// Load settings from `config/` and the environment
///
/// Priority: env vars (`CONCIERGE__SECTION__KEY`) > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a specific config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
