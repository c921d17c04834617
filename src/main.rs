//! AskTube CLI entry point.

use anyhow::Result;
use asktube::cli::{commands, Cli, Commands};
use asktube::config::Settings;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("asktube={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Transcript { url, timestamps } => {
            commands::run_transcript(url, *timestamps, settings).await?;
        }

        Commands::Ask {
            url,
            question,
            k,
            show_context,
        } => {
            commands::run_ask(url, question, *k, *show_context, settings).await?;
        }

        Commands::Search { url, query, k } => {
            commands::run_search(url, query, *k, settings).await?;
        }

        Commands::Chat { url } => {
            commands::run_chat(url.as_deref(), settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, &config_path)?;
        }
    }

    Ok(())
}
