//! Backend selection from provider-agnostic settings
//!
//! ```ignore
//! let config = LlmProviderConfig::ollama("llama3.2").with_temperature(0.0);
//! let llm = LlmFactory::create_backend(&config)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{HttpBackendConfig, LlmBackend, OllamaBackend, OpenAIBackend};
use crate::LlmError;

const OLLAMA_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Local models served by Ollama
    #[default]
    Ollama,
    /// OpenAI or any server speaking its chat-completions API
    OpenAI,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(LlmProvider::Ollama),
            "openai" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }
}

/// What the host knows about its model before any backend exists
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub provider: LlmProvider,
    /// Falls back to `OPENAI_API_KEY` for the OpenAI provider
    pub api_key: Option<String>,
    /// Provider default when unset
    pub endpoint: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        let http = HttpBackendConfig::default();
        Self {
            provider: LlmProvider::Ollama,
            api_key: None,
            endpoint: None,
            model: http.model,
            max_tokens: http.max_tokens,
            temperature: http.temperature,
            timeout: http.timeout,
            max_retries: http.max_retries,
        }
    }
}

impl LlmProviderConfig {
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: Some(api_key.into()),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn http_config(&self) -> HttpBackendConfig {
        let (default_endpoint, api_key) = match self.provider {
            LlmProvider::Ollama => (OLLAMA_ENDPOINT, self.api_key.clone()),
            LlmProvider::OpenAI => (
                crate::backend::OPENAI_ENDPOINT,
                self.api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok()),
            ),
        };

        HttpBackendConfig {
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| default_endpoint.to_string()),
            api_key,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
            max_retries: self.max_retries,
            ..Default::default()
        }
    }
}

pub struct LlmFactory;

impl LlmFactory {
    pub fn create_backend(config: &LlmProviderConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
        let http = config.http_config();
        tracing::info!(
            provider = ?config.provider,
            model = %http.model,
            endpoint = %http.endpoint,
            "Creating LLM backend"
        );

        Ok(match config.provider {
            LlmProvider::Ollama => Arc::new(OllamaBackend::new(http)?),
            LlmProvider::OpenAI => Arc::new(OpenAIBackend::new(http)?),
        })
    }
}
