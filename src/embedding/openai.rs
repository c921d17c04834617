//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::{RetrySettings, Settings};
use crate::error::{AskTubeError, Result};
use crate::openai::{create_client, is_transient, with_retry};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, instrument};

/// OpenAI limits the number of inputs per embeddings request.
const BATCH_SIZE: usize = 100;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    max_concurrent_batches: usize,
    retry: RetrySettings,
}

impl OpenAIEmbedder {
    /// Create an embedder from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.openai)?,
            model: settings.embedding.model.clone(),
            dimensions: settings.embedding.dimensions as usize,
            max_concurrent_batches: settings.embedding.max_concurrent_batches.max(1),
            retry: settings.retry.clone(),
        })
    }

    /// Send one embeddings request.
    async fn embed_request(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = inputs.len();

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(inputs))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| AskTubeError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = with_retry(&self.retry, "Embedding request", is_transient, || async {
            self.client.embeddings().create(request.clone()).await
        })
        .await
        .map_err(|e| AskTubeError::Embedding(format!("Embedding API error: {}", e)))?;

        // Sort by index to ensure correct order
        let mut data = response.data;
        data.sort_by_key(|e| e.index);

        if data.len() != expected {
            return Err(AskTubeError::Embedding(format!(
                "Expected {} embeddings, received {}",
                expected,
                data.len()
            )));
        }

        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AskTubeError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let requests: Vec<Vec<String>> =
            texts.chunks(BATCH_SIZE).map(<[String]>::to_vec).collect();

        let batches: Vec<Vec<Vec<f32>>> = stream::iter(requests)
            .map(|batch| self.embed_request(batch))
            .buffered(self.max_concurrent_batches)
            .try_collect()
            .await?;

        let all_embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
