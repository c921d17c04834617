//! Error types for AskTube.

use thiserror::Error;

/// Library-level error type for AskTube operations.
#[derive(Error, Debug)]
pub enum AskTubeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Captions are disabled for video {0}")]
    CaptionsDisabled(String),

    #[error("No transcript for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptInLanguage {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Transcript source error: {0}")]
    TranscriptSource(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AskTubeError {
    /// Whether the error came from the transcript provider rather than from us.
    pub fn is_transcript_failure(&self) -> bool {
        matches!(
            self,
            AskTubeError::CaptionsDisabled(_)
                | AskTubeError::NoTranscriptInLanguage { .. }
                | AskTubeError::VideoUnavailable(_)
                | AskTubeError::TranscriptSource(_)
        )
    }
}

/// Result type alias for AskTube operations.
pub type Result<T> = std::result::Result<T, AskTubeError>;
