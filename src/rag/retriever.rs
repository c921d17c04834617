//! Top-k retrieval of transcript chunks for a question.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{AskTubeError, Result};
use crate::vector_index::{SearchResult, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds questions and searches a vector index.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    k: usize,
    min_score: Option<f32>,
}

impl Retriever {
    /// Create a retriever returning up to `k` chunks.
    pub fn new(embedder: Arc<dyn Embedder>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(AskTubeError::Config(
                "k must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            k,
            min_score: None,
        })
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn min_score(&self) -> Option<f32> {
        self.min_score
    }

    /// Retrieve chunks with their similarity scores.
    #[instrument(skip(self, index), fields(k = self.k))]
    pub async fn retrieve_scored(
        &self,
        index: &VectorIndex,
        question: &str,
    ) -> Result<Vec<SearchResult>> {
        if index.is_empty() {
            debug!("Index is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;

        let results = match self.min_score {
            Some(min_score) => index.search_with_threshold(&query_embedding, self.k, min_score)?,
            None => index.search(&query_embedding, self.k)?,
        };

        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }

    /// Retrieve the top-k chunks, most similar first.
    pub async fn retrieve(&self, index: &VectorIndex, question: &str) -> Result<Vec<Chunk>> {
        let results = self.retrieve_scored(index, question).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk;
    use crate::test_support::{FailingEmbedder, KeywordEmbedder, SCENARIO};

    async fn scenario_index(embedder: &KeywordEmbedder) -> VectorIndex {
        let chunks = chunk(SCENARIO, 30, 5).unwrap();
        VectorIndex::build(chunks, embedder).await.unwrap()
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let result = Retriever::new(Arc::new(KeywordEmbedder::new()), 0);
        assert!(matches!(result, Err(AskTubeError::Config(_))));
    }

    #[tokio::test]
    async fn test_retrieves_most_relevant_chunk_first() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let index = scenario_index(&embedder).await;
        let retriever = Retriever::new(embedder, 4).unwrap();

        let chunks = retriever
            .retrieve(&index, "At what temperature does water boil?")
            .await
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].text.contains("100 degrees Celsius"));
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let index = scenario_index(&embedder).await;
        let retriever = Retriever::new(embedder, 2).unwrap();

        let first = retriever.retrieve(&index, "what colour is the sky").await.unwrap();
        let second = retriever.retrieve(&index, "what colour is the sky").await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_min_score_filters_weak_matches() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let index = scenario_index(&embedder).await;
        let retriever = Retriever::new(embedder, 4).unwrap().with_min_score(Some(0.5));

        let scored = retriever
            .retrieve_scored(&index, "At what temperature does water boil?")
            .await
            .unwrap();

        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|r| r.score >= 0.5));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_propagated() {
        let index = scenario_index(&KeywordEmbedder::new()).await;
        let retriever = Retriever::new(Arc::new(FailingEmbedder), 4).unwrap();

        let result = retriever.retrieve(&index, "anything").await;
        assert!(matches!(result, Err(AskTubeError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedding() {
        let retriever = Retriever::new(Arc::new(FailingEmbedder), 4).unwrap();
        let chunks = retriever.retrieve(&VectorIndex::default(), "anything").await.unwrap();
        assert!(chunks.is_empty());
    }
}
