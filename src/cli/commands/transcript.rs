//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{format_timestamp, Output};
use crate::config::Settings;
use crate::error::AskTubeError;
use crate::transcript::{parse_video_id, TranscriptSource, YtDlpTranscriptSource};
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(url: &str, timestamps: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcript) {
        super::report_error(&e);
        return Err(e.into());
    }

    let video_id = parse_video_id(url).ok_or_else(|| {
        AskTubeError::InvalidInput(format!("Not a YouTube video URL or ID: {}", url))
    })?;

    let source = YtDlpTranscriptSource::from_settings(&settings.transcript)?;
    let spinner = Output::spinner("Fetching transcript...");
    let result = source.fetch(&video_id, &settings.transcript.languages).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(transcript) => transcript,
        Err(e) => {
            super::report_error(&e);
            return Err(e.into());
        }
    };

    Output::header(transcript.display_title());
    Output::kv("Video", &transcript.video_id);
    Output::kv(
        "Language",
        &format!(
            "{}{}",
            transcript.language,
            if transcript.is_generated {
                " (auto-generated)"
            } else {
                ""
            }
        ),
    );
    Output::kv("Duration", &format_timestamp(transcript.duration_seconds()));
    println!();

    if timestamps {
        for segment in &transcript.segments {
            println!(
                "[{}] {}",
                format_timestamp(segment.start_seconds),
                segment.text
            );
        }
    } else {
        println!("{}", transcript.text());
    }

    Ok(())
}
