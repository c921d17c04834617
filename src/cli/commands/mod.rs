//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod search;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;
pub use transcript::run_transcript;

use crate::cli::Output;
use crate::error::{AskTubeError, Result};
use crate::session::Session;

/// Fetch and index a video, reporting progress.
async fn load_video(session: &mut Session, url: &str) -> Result<()> {
    let spinner = Output::spinner("Fetching transcript...");
    let transcript = match session.fetch_transcript(url).await {
        Ok(transcript) => transcript,
        Err(e) => {
            spinner.finish_and_clear();
            report_error(&e);
            return Err(e);
        }
    };

    spinner.set_message(format!("Indexing \"{}\"...", transcript.display_title()));
    let result = session.build_index().await;
    spinner.finish_and_clear();

    match result {
        Ok(chunks) => {
            Output::success(&format!(
                "Indexed \"{}\" ({} chunks)",
                transcript.display_title(),
                chunks
            ));
            Ok(())
        }
        Err(e) => {
            report_error(&e);
            Err(e)
        }
    }
}

/// Print an error with a hint where one helps.
fn report_error(error: &AskTubeError) {
    if error.is_transcript_failure() {
        Output::error(&format!("Could not get a transcript: {}", error));
    } else {
        Output::error(&error.to_string());
    }

    match error {
        AskTubeError::NoTranscriptInLanguage { .. } => {
            Output::info("Add one of the available languages to [transcript] languages in your config.");
        }
        AskTubeError::ToolNotFound(_) => {
            Output::info("Install yt-dlp: https://github.com/yt-dlp/yt-dlp#installation");
        }
        AskTubeError::Timeout(_) => {
            Output::info("Raise [session] operation_timeout_secs in your config to allow more time.");
        }
        _ => {}
    }
}
