//! RAG (Retrieval-Augmented Generation) over a single transcript.
//!
//! Retrieval picks the chunks closest to a question, the context assembler
//! joins them, and the generator answers from that context only.

pub mod context;
mod generator;
mod retriever;

pub use context::{assemble_context, CONTEXT_DELIMITER};
pub use generator::{AnswerGenerator, OpenAIGenerator};
pub use retriever::Retriever;

use crate::chunking::Chunk;

/// Shown when retrieval produced nothing to answer from.
pub const NO_RELEVANT_CONTENT: &str =
    "No relevant transcript chunks found. Try rephrasing your question.";

/// The outcome of asking a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// The generator answered from retrieved transcript context.
    Grounded {
        /// The generated answer.
        text: String,
        /// The context string the answer was generated from.
        context: String,
        /// Retrieved chunks in rank order.
        sources: Vec<Chunk>,
    },
    /// Nothing relevant was retrieved; the generator was not called.
    NoRelevantContent,
}

impl Answer {
    /// Answer text for display.
    pub fn text(&self) -> &str {
        match self {
            Answer::Grounded { text, .. } => text,
            Answer::NoRelevantContent => NO_RELEVANT_CONTENT,
        }
    }

    /// Retrieved chunks the answer is based on.
    pub fn sources(&self) -> &[Chunk] {
        match self {
            Answer::Grounded { sources, .. } => sources,
            Answer::NoRelevantContent => &[],
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Answer::Grounded { .. })
    }
}
