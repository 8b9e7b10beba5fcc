//! Chat completion backends
//!
//! `OllamaBackend` speaks Ollama's `/api/chat`; `OpenAIBackend` speaks the
//! `/chat/completions` dialect used by OpenAI and compatible servers. Both
//! share [`HttpBackendConfig`] and the retrying transport in [`transport`].

mod ollama;
mod openai;
mod transport;

pub use ollama::OllamaBackend;
pub use openai::OpenAIBackend;
pub(crate) use openai::OPENAI_ENDPOINT;

use std::time::Duration;

use async_trait::async_trait;

use crate::prompt::Message;
use crate::LlmError;

/// Connection and sampling settings for an HTTP chat backend
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL, without the API path
    pub endpoint: String,
    /// Bearer token; only sent when present
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
    /// Retries after the first attempt; only transient failures are retried
    pub max_retries: u32,
    /// Doubles after every retry
    pub initial_backoff: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            api_key: None,
            model: "llama3.2".to_string(),
            max_tokens: 512,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl HttpBackendConfig {
    pub(crate) fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

/// One completed generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    /// Completion tokens, when the server reports them
    pub tokens: usize,
    pub total_time_ms: u64,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Error,
}

/// A chat model reachable behind some API
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Complete a conversation
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Cheap reachability probe
    async fn is_available(&self) -> bool;

    fn model_name(&self) -> &str;
}
