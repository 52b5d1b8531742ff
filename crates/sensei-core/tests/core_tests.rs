use std::fs;
use std::io::Write;
use tempfile::TempDir;

use sensei_core::chunker::chunk_document;
use sensei_core::corpus::{list_text_files, iter_documents};

#[test]
fn single_small_file_is_one_document() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Short text").unwrap();

    let docs = iter_documents(dir).collect::<Vec<_>>();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].source, "a.txt");
    assert_eq!(docs[0].text.trim(), "Short text");
    assert_eq!(chunk_document(&docs[0], 500, 50).len(), 1, "one small file becomes one chunk");
}

#[test]
fn scan_is_recursive_sorted_and_filters_extensions() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("graphs/trees")).unwrap();
    fs::write(dir.join("b.md"), "bravo").unwrap();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    fs::write(dir.join("graphs/trees/bst.MD"), "tree").unwrap();
    fs::write(dir.join("notes.pdf"), "binary").unwrap();
    fs::write(dir.join("README"), "no extension").unwrap();

    let files = list_text_files(dir);
    let names: Vec<String> = files.iter().map(|p| p.strip_prefix(dir).unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(names, vec!["a.txt", "b.md", "graphs/trees/bst.MD"]);

    let docs = iter_documents(dir).collect::<Vec<_>>();
    assert_eq!(docs[2].source, "graphs/trees/bst.MD");
}

#[test]
fn invalid_utf8_is_replaced_not_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.txt"), b"heap \xff\xfe sort").unwrap();

    let docs = iter_documents(tmp.path()).collect::<Vec<_>>();

    assert_eq!(docs.len(), 1);
    assert!(docs[0].text.starts_with("heap "));
    assert!(docs[0].text.ends_with(" sort"));
    assert!(docs[0].text.contains('\u{FFFD}'));
}

#[test]
fn missing_root_is_empty_not_an_error() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(iter_documents(&tmp.path().join("does-not-exist")).count(), 0);
    assert!(list_text_files(tmp.path()).is_empty());
}

#[test]
fn documents_are_read_lazily_in_scan_order() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.md"), "first").unwrap();
    fs::write(tmp.path().join("b.md"), "second").unwrap();
    let mut docs = iter_documents(tmp.path());
    assert_eq!(docs.next().map(|d| d.text), Some("first".to_string()));
    // the second file is only read when requested
    fs::write(tmp.path().join("b.md"), "rewritten").unwrap();
    assert_eq!(docs.next().map(|d| d.text), Some("rewritten".to_string()));
    assert!(docs.next().is_none());
}
