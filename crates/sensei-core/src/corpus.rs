//! Filesystem corpus: recursive scan for `.md` / `.txt` files.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::Document;

pub const TEXT_EXTENSIONS: &[&str] = &["md", "txt"];

pub fn is_text_like(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)))
}

/// All text-like files under `root`, sorted. A missing root yields an empty list.
pub fn list_text_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_text_like(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Read a file as UTF-8, substituting invalid sequences.
pub fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

pub fn relative_source(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().to_string()
}

/// Text-like documents under `root`, read one at a time in scan order.
/// Unreadable files are skipped with a warning.
pub fn iter_documents(root: &Path) -> impl Iterator<Item = Document> + '_ {
    let files = list_text_files(root);
    if files.is_empty() {
        debug!(root = %root.display(), "no text files found");
    }
    files.into_iter().filter_map(move |path| match read_lossy(&path) {
        Ok(text) => Some(Document { text, source: relative_source(root, &path) }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    })
}
