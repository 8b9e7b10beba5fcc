//! Text Embeddings
//!
//! The `Embedder` trait turns chunks and queries into dense vectors.
//! `SimpleEmbedder` is a deterministic bag-of-words hash embedder that needs
//! no model, used offline and in tests.

use async_trait::async_trait;

use crate::RagError;

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension
    pub embedding_dim: usize,
    /// Normalize embeddings to unit length
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            normalize: true,
        }
    }
}

/// Produces dense vectors for documents and queries
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed document chunks, one vector per input, in order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError>;

    fn dim(&self) -> usize;

    fn name(&self) -> &str;
}

/// Simple embedder for testing (no model required)
#[derive(Debug, Clone, Default)]
pub struct SimpleEmbedder {
    config: EmbeddingConfig,
}

impl SimpleEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// Hash each lowercase word into a bucket and count
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim.max(1);
        let mut embedding = vec![0.0f32; dim];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let idx = (fnv1a(&word.to_lowercase()) % dim as u64) as usize;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            normalize(&mut embedding);
        }

        embedding
    }
}

#[async_trait]
impl Embedder for SimpleEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed(text))
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn name(&self) -> &str {
        "simple"
    }
}

fn fnv1a(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Scale a vector to unit length in place; zero vectors are left alone
pub fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}
