//! Content chunking for breaking transcripts into searchable windows.
//!
//! Windows are measured in Unicode characters. Two strategies are provided:
//! a word-aware recursive splitter (the default) and fixed-stride windows.

mod fixed;
mod recursive;

pub use fixed::FixedChunker;
pub use recursive::RecursiveChunker;

use crate::error::{AskTubeError, Result};
use serde::{Deserialize, Serialize};

/// A window of transcript text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the transcript.
    pub ordinal: usize,
    /// Text content of this chunk.
    pub text: String,
    /// Character offset of the first character in the source text.
    pub start: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(ordinal: usize, text: String, start: usize) -> Self {
        Self {
            ordinal,
            text,
            start,
        }
    }

    /// Length of the chunk in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Character offset one past the last character in the source text.
    pub fn end(&self) -> usize {
        self.start + self.char_len()
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Pack whole words, carrying trailing words forward as overlap.
    #[default]
    Recursive,
    /// Fixed-size windows with an exact character overlap.
    Fixed,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recursive" | "words" => Ok(ChunkingStrategy::Recursive),
            "fixed" | "characters" => Ok(ChunkingStrategy::Fixed),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingStrategy::Recursive => write!(f, "recursive"),
            ChunkingStrategy::Fixed => write!(f, "fixed"),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub max_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
    /// Windowing strategy.
    pub strategy: ChunkingStrategy,
}

impl ChunkingConfig {
    pub fn new(max_size: usize, overlap: usize) -> Self {
        Self {
            max_size,
            overlap,
            strategy: ChunkingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check `max_size > 0` and `overlap < max_size`.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(AskTubeError::Config(
                "chunk max_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.max_size {
            return Err(AskTubeError::Config(format!(
                "chunk overlap ({}) must be smaller than max_size ({})",
                self.overlap, self.max_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

/// Trait for windowing implementations.
///
/// Implementations receive validated parameters and return `(start, end)`
/// character spans in order.
pub trait Chunker: Send + Sync {
    fn windows(&self, chars: &[char], max_size: usize, overlap: usize) -> Vec<(usize, usize)>;
}

/// Create a chunker for the strategy.
pub fn create_chunker(strategy: ChunkingStrategy) -> Box<dyn Chunker> {
    match strategy {
        ChunkingStrategy::Recursive => Box::new(RecursiveChunker::new()),
        ChunkingStrategy::Fixed => Box::new(FixedChunker::new()),
    }
}

/// Split `text` into overlapping chunks with the default strategy.
pub fn chunk(text: &str, max_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    chunk_with(text, &ChunkingConfig::new(max_size, overlap))
}

/// Split `text` into overlapping chunks as described by `config`.
pub fn chunk_with(text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let chunker = create_chunker(config.strategy);

    let chunks = chunker
        .windows(&chars, config.max_size, config.overlap)
        .into_iter()
        .filter(|&(start, end)| chars[start..end].iter().any(|c| !c.is_whitespace()))
        .enumerate()
        .map(|(ordinal, (start, end))| {
            Chunk::new(ordinal, chars[start..end].iter().collect(), start)
        })
        .collect();

    Ok(chunks)
}

/// Split a span into hard-cut windows stepping `max_size - overlap` characters.
pub(crate) fn hard_cut(start: usize, end: usize, max_size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let stride = max_size - overlap;
    let mut windows = Vec::new();
    let mut window_start = start;

    loop {
        let window_end = (window_start + max_size).min(end);
        windows.push((window_start, window_end));
        if window_end == end {
            break;
        }
        window_start += stride;
    }

    windows
}
