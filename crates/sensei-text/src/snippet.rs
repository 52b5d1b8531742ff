/// Length of every lexical snippet, in chars.
pub const SNIPPET_CHARS: usize = 800;

/// `SNIPPET_CHARS` chars of `content` centred on char offset `center`.
pub fn snippet_around(content: &str, center: usize) -> String {
    let start = center.saturating_sub(SNIPPET_CHARS / 2);
    content.chars().skip(start).take(SNIPPET_CHARS).collect()
}

/// Char offset in `content` of the earliest occurrence of any token, matching
/// case-insensitively. `None` when no token occurs in the content.
pub fn earliest_match(content: &str, tokens: &[String]) -> Option<usize> {
    let lower = content.to_lowercase();
    let byte_pos = tokens.iter().filter_map(|t| lower.find(t.as_str())).min()?;
    // lowercasing can change byte lengths; count chars in the lowered prefix
    Some(lower[..byte_pos].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_clamped_to_content() {
        assert_eq!(snippet_around("short", 3), "short");
        let long: String = "x".repeat(1000) + "needle" + &"y".repeat(1000);
        let s = snippet_around(&long, 1000);
        assert_eq!(s.chars().count(), SNIPPET_CHARS);
        assert!(s.contains("needle"));
        assert!(s.starts_with('x'));
    }

    #[test]
    fn earliest_match_is_case_insensitive_and_in_chars() {
        let tokens = vec!["heap".to_string(), "queue".to_string()];
        assert_eq!(earliest_match("A Priority Queue uses a Heap", &tokens), Some(11));
        assert_eq!(earliest_match("ééé heap", &tokens), Some(4));
        assert_eq!(earliest_match("graphs only", &tokens), None);
    }
}
