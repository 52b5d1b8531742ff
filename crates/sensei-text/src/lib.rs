//! sensei-text
//!
//! Keyword scan over the raw corpus files. Used when vector retrieval has
//! nothing to offer; no index is built or persisted.
pub mod search;
pub mod snippet;

pub use search::LexicalSearcher;
pub use snippet::{snippet_around, SNIPPET_CHARS};
