//! In-memory vector store
//!
//! Brute-force cosine similarity over unit-normalised vectors. Document
//! sets uploaded into a conversation are small, so a linear scan is enough.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::RagError;

/// A stored chunk returned by a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the chunk in insertion order
    pub index: usize,
    pub text: String,
    /// Cosine similarity to the query
    pub score: f32,
}

#[derive(Debug)]
struct Entry {
    text: String,
    vector: Vec<f32>,
}

/// Vector store held entirely in memory
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dim: usize,
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryVectorStore {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Add chunks with their vectors
    pub fn insert(&self, texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<(), RagError> {
        if texts.len() != vectors.len() {
            return Err(RagError::Index(format!(
                "{} texts but {} vectors",
                texts.len(),
                vectors.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(RagError::Index(format!(
                "vector dimension {} does not match store dimension {}",
                bad.len(),
                self.dim
            )));
        }

        let mut entries = self.entries.write();
        entries.extend(
            texts
                .into_iter()
                .zip(vectors)
                .map(|(text, vector)| Entry { text, vector }),
        );
        Ok(())
    }

    /// Top `k` chunks by cosine similarity, best first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>, RagError> {
        if query.len() != self.dim {
            return Err(RagError::Index(format!(
                "query dimension {} does not match store dimension {}",
                query.len(),
                self.dim
            )));
        }

        let entries = self.entries.read();
        let mut results: Vec<SearchResult> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SearchResult {
                index,
                text: entry.text.clone(),
                score: cosine(query, &entry.vector),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        results.truncate(k);
        Ok(results)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
