//! Interactive chat command.

use super::ask::print_answer;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::context::format_results_for_display;
use crate::session::{Session, SessionStatus};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands: :load <url>, :search <query>, :context, :status, exit";

/// Run the interactive chat command.
pub async fn run_chat(url: Option<&str>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        super::report_error(&e);
        return Err(e.into());
    }

    let mut session = Session::new(&settings)?;
    let mut show_context = false;

    println!("\n{}", style("AskTube Chat").bold().cyan());
    println!("{}\n", style(HELP).dim());

    if let Some(url) = url {
        // A failed load is reported; the user can retry with :load.
        let _ = super::load_video(&mut session, url).await;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if let Some(url) = input.strip_prefix(":load") {
            let _ = super::load_video(&mut session, url.trim()).await;
            continue;
        }

        if let Some(query) = input.strip_prefix(":search") {
            match session.search(query).await {
                Ok(results) if results.is_empty() => {
                    Output::warning("No transcript chunks matched your query.")
                }
                Ok(results) => println!("\n{}\n", format_results_for_display(&results)),
                Err(e) => super::report_error(&e),
            }
            continue;
        }

        if input == ":context" {
            show_context = !show_context;
            Output::info(&format!(
                "Context display {}",
                if show_context { "on" } else { "off" }
            ));
            continue;
        }

        if input == ":status" {
            Output::kv("Session", &session.id().to_string());
            Output::kv("State", &session.status().to_string());
            if let Some(transcript) = session.transcript() {
                Output::kv("Video", transcript.display_title());
            }
            continue;
        }

        if input.starts_with(':') {
            Output::warning(HELP);
            continue;
        }

        if session.status() != SessionStatus::Indexed {
            Output::warning("Load a video first with :load <url>");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let result = session.ask(input).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => {
                print!("{}", style("AskTube:").cyan().bold());
                print_answer(&answer, show_context);
            }
            Err(e) => super::report_error(&e),
        }
    }

    Ok(())
}
