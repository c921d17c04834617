//! Data models for transcripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timed caption segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Caption text.
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, duration_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text,
        }
    }
}

/// A fetched transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Video title, when the source reports one.
    pub title: Option<String>,
    /// Caption language code.
    pub language: String,
    /// Whether the captions were generated automatically.
    pub is_generated: bool,
    /// Individual timed segments.
    pub segments: Vec<TranscriptSegment>,
    /// Segment texts joined with single spaces.
    pub full_text: String,
    /// When the transcript was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(video_id: String, language: String, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id,
            title: None,
            language,
            is_generated: false,
            segments,
            full_text,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn generated(mut self, is_generated: bool) -> Self {
        self.is_generated = is_generated;
        self
    }

    /// Text used for indexing.
    pub fn text(&self) -> &str {
        &self.full_text
    }

    /// End of the last segment in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.start_seconds + s.duration_seconds)
            .unwrap_or(0.0)
    }

    /// Title if known, otherwise the video ID.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_concatenates_segments() {
        let transcript = Transcript::new(
            "abc".to_string(),
            "en".to_string(),
            vec![
                TranscriptSegment::new(0.0, 2.5, "The sky is blue.".to_string()),
                TranscriptSegment::new(2.5, 3.0, "The grass is green.".to_string()),
            ],
        );

        assert_eq!(transcript.text(), "The sky is blue. The grass is green.");
        assert!((transcript.duration_seconds() - 5.5).abs() < 1e-9);
        assert_eq!(transcript.display_title(), "abc");
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new("abc".to_string(), "en".to_string(), Vec::new());
        assert_eq!(transcript.text(), "");
        assert_eq!(transcript.duration_seconds(), 0.0);
    }
}
