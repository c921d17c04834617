//! AskTube - Ask questions about YouTube videos
//!
//! Fetches a video's captions and answers questions grounded only in what
//! was said in the video.
//!
//! # Overview
//!
//! A question is answered in four steps:
//! - The transcript is split into overlapping character windows
//! - Each window is embedded and stored in an in-memory vector index
//! - The question is embedded and the closest windows are retrieved
//! - A chat model answers from the retrieved windows only
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Transcript sources (yt-dlp)
//! - `chunking` - Character-window chunking strategies
//! - `embedding` - Embedding generation
//! - `vector_index` - Exact cosine-similarity index
//! - `rag` - Retrieval, context assembly and answer generation
//! - `session` - State machine tying the pipeline together
//!
//! # Example
//!
//! ```rust,no_run
//! use asktube::config::Settings;
//! use asktube::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut session = Session::new(&settings)?;
//!
//!     session.fetch_transcript("https://youtu.be/dQw4w9WgXcQ").await?;
//!     session.build_index().await?;
//!
//!     let answer = session.ask("What is the song about?").await?;
//!     println!("{}", answer.text());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod session;
pub mod transcript;
pub mod vector_index;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AskTubeError, Result};
