//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    url: &str,
    query: &str,
    k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        super::report_error(&e);
        return Err(e.into());
    }

    if let Some(k) = k {
        settings.retrieval.k = k;
    }

    let mut session = Session::new(&settings)?;
    super::load_video(&mut session, url).await?;

    let spinner = Output::spinner("Searching...");
    let results = session.search(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::warning("No transcript chunks matched your query.");
        }
        Ok(results) => {
            Output::success(&format!("Found {} chunks", results.len()));
            for (rank, result) in results.iter().enumerate() {
                Output::chunk(
                    rank + 1,
                    result.chunk.ordinal,
                    Some(result.score),
                    &result.chunk.text,
                );
            }
        }
        Err(e) => {
            super::report_error(&e);
            return Err(e.into());
        }
    }

    Ok(())
}
