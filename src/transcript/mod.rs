//! Transcript sources for AskTube.
//!
//! Captions are fetched from an external provider; the pipeline only consumes
//! the concatenated text.

mod models;
mod youtube;

pub use models::{Transcript, TranscriptSegment};
pub use youtube::{parse_video_id, CaptionTrack, YtDlpTranscriptSource};

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video in the first available preferred language.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript>;
}
