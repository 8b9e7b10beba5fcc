//! Retrieval answerer
//!
//! Answers a question from the top-k chunks of a document index by
//! "stuffing" them into a single prompt. The model is told to reply with the
//! unknown sentinel when the context does not contain the answer, which the
//! dialogue core treats as a signal to fall back.

use std::sync::Arc;

use async_trait::async_trait;
use concierge_core::{QuestionAnswerer, UNKNOWN_SENTINEL};
use concierge_llm::{LlmBackend, PromptBuilder};

use crate::indexer::DocumentIndex;
use crate::RagError;

/// Retrieval settings
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Chunks stuffed into the prompt
    pub top_k: usize,
    pub system_prompt: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            system_prompt: format!(
                "Use the following pieces of context to answer the user's question. \
                 If the answer is not in the context, reply exactly \"{}.\" \
                 Do not try to make up an answer.",
                UNKNOWN_SENTINEL
            ),
        }
    }
}

/// Document-grounded question answerer
pub struct RetrievalAnswerer {
    index: Arc<DocumentIndex>,
    llm: Arc<dyn LlmBackend>,
    config: RetrievalConfig,
}

impl RetrievalAnswerer {
    pub fn new(index: Arc<DocumentIndex>, llm: Arc<dyn LlmBackend>) -> Self {
        Self::with_config(index, llm, RetrievalConfig::default())
    }

    pub fn with_config(
        index: Arc<DocumentIndex>,
        llm: Arc<dyn LlmBackend>,
        config: RetrievalConfig,
    ) -> Self {
        Self { index, llm, config }
    }

    async fn answer_inner(&self, question: &str) -> Result<String, RagError> {
        let results = self.index.search(question, self.config.top_k).await?;
        if results.is_empty() {
            return Ok(UNKNOWN_SENTINEL.to_string());
        }

        tracing::debug!(
            chunks = results.len(),
            best_score = results[0].score,
            "Retrieved context"
        );

        let messages = results
            .into_iter()
            .fold(
                PromptBuilder::new().system(&self.config.system_prompt),
                |builder, result| builder.context(result.text),
            )
            .user(question)
            .build();

        let generation = self.llm.generate(&messages).await?;
        Ok(generation.text.trim().to_string())
    }
}

#[async_trait]
impl QuestionAnswerer for RetrievalAnswerer {
    async fn answer(&self, question: &str) -> concierge_core::Result<String> {
        Ok(self.answer_inner(question).await?)
    }

    fn name(&self) -> &str {
        "retrieval"
    }
}
