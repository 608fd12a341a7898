//! Derived-field computation for post content.
//!
//! Slug, read time and excerpt are pure functions of the title and content
//! so they can be recomputed whenever the source field changes.

use std::sync::LazyLock;

use regex::Regex;

/// Reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of plain-text characters kept in a derived excerpt, before the ellipsis.
pub const EXCERPT_CHARS: usize = 297;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid html tag pattern"));

static SLUG_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s_-]").expect("valid slug filter pattern"));

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("valid slug separator pattern"));

/// Turn a title into a URL-safe slug: lowercase ASCII letters and digits joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = SLUG_DISALLOWED.replace_all(&lower, "");
    let joined = SLUG_SEPARATORS.replace_all(kept.trim(), "-");
    joined.trim_matches('-').to_string()
}

/// Estimated reading time in whole minutes, never below one.
pub fn read_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Remove anything that looks like an HTML tag.
pub fn strip_html(content: &str) -> String {
    HTML_TAG.replace_all(content, "").into_owned()
}

/// Excerpt used when the author does not supply one.
pub fn excerpt_from(content: &str) -> String {
    let plain = strip_html(content);
    let mut excerpt: String = plain.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

/// Trim and lowercase tags, dropping blanks and repeats while keeping order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust: the (good) parts!  "), "rust-the-good-parts");
        assert_eq!(slugify("snake_case and--dashes"), "snake-case-and-dashes");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Tracker"), "caf-tracker");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_read_time() {
        assert_eq!(read_time_minutes(""), 1);
        assert_eq!(read_time_minutes("one two three"), 1);
        assert_eq!(read_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(read_time_minutes(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_excerpt_strips_html_and_truncates() {
        assert_eq!(excerpt_from("<p>Short <b>post</b></p>"), "Short post...");

        let long = "a".repeat(400);
        let excerpt = excerpt_from(&long);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags([" Rust ", "rust", "", "WebAssembly"]);
        assert_eq!(tags, vec!["rust".to_string(), "webassembly".to_string()]);
    }

    proptest! {
        #[test]
        fn slug_is_lowercase_hyphenated_ascii(title in ".{0,120}") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slug_is_stable(title in ".{0,120}") {
            let slug = slugify(&title);
            prop_assert_eq!(slugify(&slug), slug);
        }

        #[test]
        fn read_time_matches_word_count(words in proptest::collection::vec("[a-z]{1,8}", 0..1200)) {
            let content = words.join(" ");
            let expected = words.len().div_ceil(WORDS_PER_MINUTE).max(1) as u32;
            prop_assert_eq!(read_time_minutes(&content), expected);
        }
    }
}
