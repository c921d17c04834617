//! Word-aware windowing.
//!
//! Windows are packed from whole words. The next window restarts at the
//! earliest trailing words of the previous one that fit in the overlap budget.
//! Words longer than a window are hard-cut.

use super::{hard_cut, Chunker};

/// Recursive word-packing chunker.
pub struct RecursiveChunker;

impl RecursiveChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Spans of non-whitespace characters.
fn word_spans(chars: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut word_start = None;

    for (i, c) in chars.iter().enumerate() {
        match (c.is_whitespace(), word_start) {
            (false, None) => word_start = Some(i),
            (true, Some(start)) => {
                spans.push((start, i));
                word_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = word_start {
        spans.push((start, chars.len()));
    }

    spans
}

impl Chunker for RecursiveChunker {
    fn windows(&self, chars: &[char], max_size: usize, overlap: usize) -> Vec<(usize, usize)> {
        let words = word_spans(chars);
        let mut windows = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let (start, first_end) = words[i];

            if first_end - start > max_size {
                windows.extend(hard_cut(start, first_end, max_size, overlap));
                i += 1;
                continue;
            }

            let mut j = i;
            while j + 1 < words.len() && words[j + 1].1 - start <= max_size {
                j += 1;
            }
            let end = words[j].1;
            windows.push((start, end));

            if j + 1 == words.len() {
                break;
            }

            // Walk back over trailing words while they fit the overlap budget.
            let mut next = j + 1;
            while next > i + 1 && end - words[next - 1].0 <= overlap {
                next -= 1;
            }
            // Drop carried words that would leave no room for the next new word.
            while next <= j && words[j + 1].1 - words[next].0 > max_size {
                next += 1;
            }
            i = next;
        }

        windows
    }
}
