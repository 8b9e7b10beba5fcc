//! LLM Integration
//!
//! Features:
//! - Ollama and OpenAI-compatible chat backends
//! - Retry with exponential backoff on transient failures
//! - Prompt assembly helpers

pub mod backend;
pub mod factory;
pub mod prompt;

pub use backend::{
    FinishReason, GenerationResult, HttpBackendConfig, LlmBackend, OllamaBackend, OpenAIBackend,
};
pub use factory::{LlmFactory, LlmProvider, LlmProviderConfig};
pub use prompt::{parse_tool_call, Message, ParsedToolCall, PromptBuilder, Role, ToolDefinition};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for concierge_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => concierge_core::Error::Configuration(msg),
            other => concierge_core::Error::Reasoning(other.to_string()),
        }
    }
}
