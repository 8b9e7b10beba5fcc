//! RAG (Retrieval-Augmented Generation) over uploaded documents
//!
//! Features:
//! - Recursive character chunking with overlap
//! - Pluggable embedders (hash-based for offline use, Ollama for real models)
//! - In-memory cosine-similarity vector store
//! - "Stuff" question answering: top-k chunks in one prompt, with an
//!   "I don't know" escape hatch the dialogue core falls back on

pub mod answerer;
pub mod chunker;
pub mod embeddings;
pub mod indexer;
pub mod ollama_embeddings;
pub mod vector_store;

pub use answerer::{RetrievalAnswerer, RetrievalConfig};
pub use chunker::{ChunkConfig, RecursiveChunker};
pub use embeddings::{Embedder, EmbeddingConfig, SimpleEmbedder};
pub use indexer::{DocumentIndex, DocumentIndexer};
pub use ollama_embeddings::{OllamaEmbedder, OllamaEmbeddingConfig};
pub use vector_store::{InMemoryVectorStore, SearchResult};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<concierge_llm::LlmError> for RagError {
    fn from(err: concierge_llm::LlmError) -> Self {
        RagError::Generation(err.to_string())
    }
}

impl From<RagError> for concierge_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Configuration(msg) => concierge_core::Error::Configuration(msg),
            other => concierge_core::Error::Retrieval(other.to_string()),
        }
    }
}
