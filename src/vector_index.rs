//! In-memory vector index over transcript chunks.
//!
//! An index is built once from a complete chunk list and never modified.
//! Search is exact: every chunk is scored by cosine similarity.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{AskTubeError, Result};
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

/// A chunk together with its embedding.
#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// A search result with score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Searchable collection of embedded chunks.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// Either all chunks are embedded and indexed, or an error is returned and
    /// nothing is built.
    #[instrument(skip(chunks, embedder), fields(chunks = chunks.len()))]
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            debug!("No chunks to index");
            return Ok(Self::default());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let index = Self::from_embeddings(chunks, embeddings)?;
        if index.dimensions != embedder.dimensions() {
            return Err(AskTubeError::Embedding(format!(
                "Embedder returned {} dimensions, configured for {}",
                index.dimensions,
                embedder.dimensions()
            )));
        }

        info!(
            "Indexed {} chunks ({} dimensions)",
            index.len(),
            index.dimensions
        );
        Ok(index)
    }

    /// Pair chunks with precomputed embeddings, checking counts and dimensions.
    pub fn from_embeddings(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(AskTubeError::Embedding(format!(
                "Expected {} embeddings, received {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if !chunks.is_empty() && dimensions == 0 {
            return Err(AskTubeError::Embedding(
                "Embedder returned an empty vector".to_string(),
            ));
        }
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(AskTubeError::Embedding(format!(
                "Embedding {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimensions
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensions, zero for an empty index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Indexed chunks in ordinal order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Return up to `limit` chunks ranked by descending similarity.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::NEG_INFINITY)
    }

    /// Search with a minimum similarity threshold.
    ///
    /// Equal scores keep chunk order, so results are reproducible.
    pub fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        if query_embedding.len() != self.dimensions {
            return Err(AskTubeError::Embedding(format!(
                "Query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.ordinal.cmp(&b.chunk.ordinal))
        });
        results.truncate(limit);

        Ok(results)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
