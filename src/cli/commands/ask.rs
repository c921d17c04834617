//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Answer;
use crate::session::Session;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    url: &str,
    question: &str,
    k: Option<usize>,
    show_context: bool,
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

    let spinner = Output::spinner("Thinking...");
    let result = session.ask(question).await;
    spinner.finish_and_clear();

    let answer = match result {
        Ok(answer) => answer,
        Err(e) => {
            super::report_error(&e);
            return Err(e.into());
        }
    };

    print_answer(&answer, show_context);
    Ok(())
}

/// Print an answer and, optionally, the chunks it was grounded on.
pub(super) fn print_answer(answer: &Answer, show_context: bool) {
    if !answer.is_grounded() {
        Output::warning(answer.text());
        return;
    }

    println!("\n{}\n", answer.text());

    if show_context {
        Output::header("Context");
        for (rank, chunk) in answer.sources().iter().enumerate() {
            Output::chunk(rank + 1, chunk.ordinal, None, &chunk.text);
        }
    }
}
