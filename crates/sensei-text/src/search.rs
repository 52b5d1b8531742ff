use std::path::PathBuf;

use tracing::{debug, warn};

use sensei_core::corpus::{list_text_files, read_lossy, relative_source};
use sensei_core::types::RetrievedContext;

use crate::snippet::{earliest_match, snippet_around, SNIPPET_CHARS};

const FILENAME_WEIGHT: usize = 2;
const CONTENT_WEIGHT: usize = 1;

pub struct LexicalSearcher {
    root: PathBuf,
}

struct Candidate {
    source: String,
    content: String,
    score: usize,
    first_match: Option<usize>,
}

impl LexicalSearcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keyword-scored snippets, best file first. Every file scores
    /// `2 * filename hits + content hits`; when nothing scores, the first
    /// file's opening snippet is returned so a non-empty corpus always yields
    /// something. Lexical contexts carry score 0.0.
    pub fn search(&self, query: &str, k: usize) -> Vec<RetrievedContext> {
        if k == 0 {
            return Vec::new();
        }
        let tokens: Vec<String> = query.to_lowercase().split_whitespace().map(str::to_string).collect();

        let mut candidates = Vec::new();
        for path in list_text_files(&self.root) {
            let content = match read_lossy(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "lexical scan skipped file");
                    continue;
                }
            };
            let file_name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
            let lower = content.to_lowercase();
            let name_hits = tokens.iter().filter(|t| file_name.contains(t.as_str())).count();
            let content_hits = tokens.iter().filter(|t| lower.contains(t.as_str())).count();
            candidates.push(Candidate {
                source: relative_source(&self.root, &path),
                score: FILENAME_WEIGHT * name_hits + CONTENT_WEIGHT * content_hits,
                first_match: if content_hits > 0 { earliest_match(&content, &tokens) } else { None },
                content,
            });
        }

        if candidates.is_empty() {
            debug!(root = %self.root.display(), "lexical scan found no files");
            return Vec::new();
        }

        if candidates.iter().all(|c| c.score == 0) {
            let first = &candidates[0];
            debug!(source = %first.source, "no keyword hits, returning first file");
            return vec![RetrievedContext {
                text: first.content.chars().take(SNIPPET_CHARS).collect(),
                source: first.source.clone(),
                score: 0.0,
            }];
        }

        candidates.retain(|c| c.score > 0);
        // stable: ties keep scan order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
            .into_iter()
            .take(k)
            .map(|c| RetrievedContext {
                text: snippet_around(&c.content, c.first_match.unwrap_or(0)),
                source: c.source,
                score: 0.0,
            })
            .collect()
    }
}
