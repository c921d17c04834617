//! Configuration module for AskTube.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GenerationPrompt, Prompts, RagPrompts, GROUNDING_RULES};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, OpenAISettings,
    PromptSettings, RetrievalSettings, RetrySettings, SessionSettings, Settings,
    TranscriptSettings,
};
