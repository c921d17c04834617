//! Context assembly for RAG prompts.

use crate::chunking::Chunk;
use crate::vector_index::SearchResult;

/// Separator placed between retrieved chunks.
pub const CONTEXT_DELIMITER: &str = "\n\n";

/// Join retrieved chunks in rank order.
pub fn assemble_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Format scored results for display to the user.
pub fn format_results_for_display(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(rank, result)| {
            format!(
                "[{}] chunk #{} (score: {:.2})\n{}",
                rank + 1,
                result.chunk.ordinal,
                result.score,
                result.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
