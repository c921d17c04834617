//! Answer generation with a hosted chat model.

use crate::config::{GenerationPrompt, RetrySettings, Settings};
use crate::error::{AskTubeError, Result};
use crate::openai::{create_client, is_transient, with_retry};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for answer generation.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Produce answer text for a rendered prompt.
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String>;
}

/// Chat-completions based answer generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    retry: RetrySettings,
}

impl OpenAIGenerator {
    /// Create a generator from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.openai)?,
            model: settings.generation.model.clone(),
            temperature: settings.generation.temperature,
            retry: settings.retry.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerGenerator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system.clone())
                .build()
                .map_err(|e| AskTubeError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user.clone())
                .build()
                .map_err(|e| AskTubeError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| AskTubeError::Generation(e.to_string()))?;

        let response = with_retry(&self.retry, "Chat completion", is_transient, || async {
            self.client.chat().create(request.clone()).await
        })
        .await
        .map_err(|e| AskTubeError::Generation(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| AskTubeError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer of {} characters", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_uses_configured_model() {
        let mut settings = Settings::default();
        settings.generation.model = "gpt-4.1-mini".to_string();
        let generator = OpenAIGenerator::from_settings(&settings).unwrap();
        assert_eq!(generator.model(), "gpt-4.1-mini");
    }
}
