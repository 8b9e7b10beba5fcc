//! Conversational agent
//!
//! Features:
//! - Explicit session object owned by the host
//! - Pure booking dialogue transition (trigger, slot filling, commit)
//! - Orchestrator routing to booking, document retrieval, or reasoning
//! - LLM-backed reasoning agent used as the last-resort answerer

pub mod dialogue;
pub mod orchestrator;
pub mod reasoning;
pub mod session;

pub use dialogue::{transition, Action, Step};
pub use orchestrator::{Clock, Orchestrator, FALLBACK_REPLY};
pub use reasoning::{ReasoningAgent, DEFAULT_SYSTEM_PROMPT};
pub use session::Session;

use thiserror::Error;

/// Agent construction errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] concierge_llm::LlmError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
