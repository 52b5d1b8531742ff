//! Fixed-size overlapping windows over a document's text.
//!
//! Windows are measured in chars so a chunk never splits a UTF-8 sequence.

use crate::types::{Chunk, Document};

/// Split `text` into windows of `size` chars, each starting `size - overlap`
/// chars after the previous one. The last window may be shorter.
///
/// Stops as soon as a window reaches the end of the text. When
/// `overlap >= size` the windows are laid end to end instead.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || size == 0 {
        return Vec::new();
    }
    // Byte offset of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < len {
        let end = (start + size).min(len);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        if end == len {
            break;
        }
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }
    chunks
}

pub fn chunk_document(doc: &Document, size: usize, overlap: usize) -> Vec<Chunk> {
    chunk_text(&doc.text, size, overlap)
        .into_iter()
        .map(|text| Chunk { text, source: doc.source.clone() })
        .collect()
}
