//! Text helpers shared by the classifier and the feed adapter.

use regwatch_shared::TRUNCATION_MARKER;

/// Lowercased `"{title} {description}"`, the haystack every keyword rule searches.
pub fn match_text(title: &str, description: &str) -> String {
    format!("{title} {description}").to_lowercase()
}

/// Whether `text` contains any of `keywords` as a substring.
pub fn contains_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|kw| text.contains(kw.as_ref()))
}

/// Cut a description to `limit` characters, appending `...` when anything was removed.
pub fn truncate_description(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_text_joins_and_lowercases() {
        assert_eq!(match_text("SEC Adopts", "Final Rule"), "sec adopts final rule");
    }

    #[test]
    fn contains_any_is_substring_based() {
        assert!(contains_any("judge blocks sb 253", &["injunction", "blocks"]));
        assert!(!contains_any("quarterly update", &["lawsuit"]));
        assert!(!contains_any::<&str>("anything", &[]));
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_description("short", 500), "short");
        assert_eq!(truncate_description("exactly", 7), "exactly");
    }

    #[test]
    fn long_text_gets_marker() {
        let text = "a".repeat(600);
        let cut = truncate_description(&text, 500);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_description(&text, 3), "ééé...");
    }
}
