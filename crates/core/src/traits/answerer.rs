//! Question answering capability

use async_trait::async_trait;

use crate::Result;

/// Substring an answerer emits when the question cannot be answered from its source
pub const UNKNOWN_SENTINEL: &str = "I don't know";

/// True when an answer is empty or carries the unknown sentinel
pub fn is_unknown(answer: &str) -> bool {
    answer.trim().is_empty() || answer.contains(UNKNOWN_SENTINEL)
}

/// Something that turns a free-text question into an answer
///
/// Implementations:
/// - `RetrievalAnswerer` - grounded in an uploaded document index
/// - `ReasoningAgent` - general-purpose LLM fallback
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Answer the question, or return text containing [`UNKNOWN_SENTINEL`]
    async fn answer(&self, question: &str) -> Result<String>;

    /// Name for logging
    fn name(&self) -> &str;
}
