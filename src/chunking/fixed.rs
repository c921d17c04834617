//! Fixed-stride windowing.
//!
//! Every window is exactly `max_size` characters (the last may be shorter) and
//! starts `max_size - overlap` characters after the previous one.

use super::{hard_cut, Chunker};

/// Fixed-size chunker with an exact character overlap.
pub struct FixedChunker;

impl FixedChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FixedChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for FixedChunker {
    fn windows(&self, chars: &[char], max_size: usize, overlap: usize) -> Vec<(usize, usize)> {
        if chars.is_empty() {
            return Vec::new();
        }
        hard_cut(0, chars.len(), max_size, overlap)
    }
}
