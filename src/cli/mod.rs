//! CLI module for AskTube.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_timestamp, Output};

use clap::{Parser, Subcommand};

/// AskTube - Ask questions about YouTube videos
///
/// Fetches a video's captions, indexes them, and answers questions using only
/// what was said in the video.
#[derive(Parser, Debug)]
#[command(name = "asktube")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ASKTUBE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the transcript of a video
    Transcript {
        /// YouTube URL or video ID
        url: String,

        /// Print one timed segment per line
        #[arg(short, long)]
        timestamps: bool,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube URL or video ID
        url: String,

        /// The question to ask
        question: String,

        /// Number of transcript chunks to retrieve
        #[arg(short)]
        k: Option<usize>,

        /// Print the retrieved context after the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Show the transcript chunks closest to a query, with scores
    Search {
        /// YouTube URL or video ID
        url: String,

        /// Search query
        query: String,

        /// Number of chunks to return
        #[arg(short)]
        k: Option<usize>,
    },

    /// Start an interactive question session
    Chat {
        /// YouTube URL or video ID to load first
        url: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "asktube",
            "-vv",
            "ask",
            "https://youtu.be/dQw4w9WgXcQ",
            "What is this about?",
            "-k",
            "6",
            "--show-context",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask {
                url,
                question,
                k,
                show_context,
            } => {
                assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(question, "What is this about?");
                assert_eq!(k, Some(6));
                assert!(show_context);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_chat_url_is_optional() {
        let cli = Cli::try_parse_from(["asktube", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { url: None }));
    }
}
