//! Prompt templates for AskTube.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts
//! directory. The grounding rules are always sent first and cannot be replaced.

use crate::error::{AskTubeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Instructions that keep answers tied to the retrieved transcript.
pub const GROUNDING_RULES: &str = "You are a helpful assistant.
Answer ONLY from the provided transcript context.
If the context is insufficient, just say you don't know.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Extra system instructions appended after the grounding rules.
    pub system: String,
    /// User message template with `{{context}}` and `{{question}}` placeholders.
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "The context is an excerpt of a YouTube video transcript. \
                     Do not use outside knowledge about the video or its topic."
                .to_string(),
            user: "{{context}}\nQuestion: {{question}}".to_string(),
        }
    }
}

/// A rendered prompt ready for the answer generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        prompts.validate()?;
        Ok(prompts)
    }

    /// A user template that drops the context or the question cannot ground an answer.
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{{context}}", "{{question}}"] {
            if !self.rag.user.contains(placeholder) {
                return Err(AskTubeError::Config(format!(
                    "RAG user prompt must contain {}",
                    placeholder
                )));
            }
        }
        Ok(())
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the generation prompt for a question and its assembled context.
    pub fn rag_prompt(&self, context: &str, question: &str) -> GenerationPrompt {
        let extra = self.render_with_custom(&self.rag.system, &HashMap::new());
        let system = if extra.trim().is_empty() {
            GROUNDING_RULES.to_string()
        } else {
            format!("{}\n\n{}", GROUNDING_RULES, extra.trim())
        };

        // Substitute the context last so transcript text is never re-scanned
        // for placeholders.
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        let user = self
            .render_with_custom(&self.rag.user, &vars)
            .replace("{{context}}", context);

        GenerationPrompt { system, user }
    }
}
