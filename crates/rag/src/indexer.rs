//! Document indexing
//!
//! Turns raw document texts into a searchable index: chunk, embed, store.

use std::sync::Arc;

use crate::chunker::RecursiveChunker;
use crate::embeddings::Embedder;
use crate::vector_store::{InMemoryVectorStore, SearchResult};
use crate::RagError;

/// Builds document indexes
pub struct DocumentIndexer {
    chunker: RecursiveChunker,
    embedder: Arc<dyn Embedder>,
}

impl DocumentIndexer {
    pub fn new(chunker: RecursiveChunker, embedder: Arc<dyn Embedder>) -> Self {
        Self { chunker, embedder }
    }

    /// Build an index over the given documents
    ///
    /// Returns `Ok(None)` when no document contains usable text.
    pub async fn build(&self, documents: &[String]) -> Result<Option<DocumentIndex>, RagError> {
        let mut chunks = Vec::new();
        for (i, document) in documents.iter().enumerate() {
            if document.trim().is_empty() {
                tracing::debug!(document = i, "Skipping empty document");
                continue;
            }
            chunks.extend(self.chunker.split(document));
        }

        if chunks.is_empty() {
            tracing::info!(documents = documents.len(), "No usable text to index");
            return Ok(None);
        }

        let vectors = self.embedder.embed_documents(&chunks).await?;
        let dim = vectors
            .first()
            .map(Vec::len)
            .ok_or_else(|| RagError::Embedding("Embedder returned no vectors".to_string()))?;

        let chunk_count = chunks.len();
        let store = InMemoryVectorStore::new(dim);
        store.insert(chunks, vectors)?;

        tracing::info!(
            documents = documents.len(),
            chunks = chunk_count,
            embedder = self.embedder.name(),
            "Document index built"
        );

        Ok(Some(DocumentIndex {
            store,
            embedder: Arc::clone(&self.embedder),
        }))
    }
}

/// A searchable set of document chunks
pub struct DocumentIndex {
    store: InMemoryVectorStore,
    embedder: Arc<dyn Embedder>,
}

impl DocumentIndex {
    /// Chunks most similar to the question
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<SearchResult>, RagError> {
        let query = self.embedder.embed_query(question).await?;
        self.store.search(&query, k)
    }

    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkConfig;
    use crate::embeddings::SimpleEmbedder;

    fn indexer() -> DocumentIndexer {
        DocumentIndexer::new(
            RecursiveChunker::new(ChunkConfig::default()).unwrap(),
            Arc::new(SimpleEmbedder::default()),
        )
    }

    #[tokio::test]
    async fn test_build_none_without_text() {
        let indexer = indexer();
        assert!(indexer.build(&[]).await.unwrap().is_none());
        assert!(indexer
            .build(&["".to_string(), "  \n ".to_string()])
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_finds_relevant_chunk() {
        let docs = vec![
            "The clinic opens at nine in the morning.".to_string(),
            "".to_string(),
            "Parking is free for patients behind the building.".to_string(),
        ];
        let index = indexer().build(&docs).await.unwrap().unwrap();
        assert_eq!(index.chunk_count(), 2);

        let results = index.search("where is parking", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].text.contains("Parking"));
    }
}
