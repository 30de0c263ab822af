use crate::regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static DOI_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(?:dx\.)?doi\.org/(.+)$").unwrap());

/// Formats a DOI string by removing URL prefixes, `[doi]` suffixes and trailing punctuation
///
/// # Arguments
///
/// * `doi_str` - The DOI string to format
pub fn format_doi(doi_str: &str) -> Option<String> {
    if doi_str.is_empty() {
        return None;
    }
    let doi = doi_str
        .trim()
        .trim_end_matches("[doi]")
        .trim()
        .replace(|c: char| c.is_whitespace(), "")
        .to_lowercase();

    // Find the first occurrence of "10." which typically starts a DOI
    let pos = doi.find("10.")?;
    let doi = &doi[pos..];
    let doi = match DOI_URL_REGEX.captures(doi) {
        Some(captures) => captures[1].to_string(),
        None => doi.to_string(),
    };
    Some(doi.trim_end_matches(['.', ',', ';']).to_string())
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes quote characters wrapping a title.
pub fn strip_wrapping_quotes(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .trim()
}

/// Number of whitespace-separated words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercase set of whitespace-separated tokens.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Lowercase set of tokens with surrounding punctuation removed.
pub fn bag_of_words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Jaccard similarity of the lowercase word sets of two strings.
///
/// Returns 0.0 when both strings are empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Returns the nearest char boundary at or below `index`.
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_format_doi() {
        let test_cases = vec![
            ("10.1000/test", Some("10.1000/test".to_string())),
            ("10.1000/test [doi]", Some("10.1000/test".to_string())),
            ("https://doi.org/10.1000/test", Some("10.1000/test".to_string())),
            ("http://dx.doi.org/10.1000/test", Some("10.1000/test".to_string())),
            ("DOI: 10.1000/TEST", Some("10.1000/test".to_string())),
            ("10.1037/0033-295X.84.3.191.", Some("10.1037/0033-295x.84.3.191".to_string())),
            ("", None),
            ("invalid", None),
        ];

        for (input, expected) in test_cases {
            assert_eq!(format_doi(input), expected);
        }
    }

    #[rstest]
    #[case("  The   Social\nConstruction ", "The Social Construction")]
    #[case("", "")]
    #[case("one", "one")]
    fn test_normalize_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[rstest]
    #[case("\"Quoted Title\"", "Quoted Title")]
    #[case("“Curly Title”", "Curly Title")]
    #[case("Plain Title", "Plain Title")]
    fn test_strip_wrapping_quotes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_wrapping_quotes(input), expected);
    }

    #[test]
    fn test_jaccard_similarity() {
        assert_eq!(jaccard_similarity("the social world", "The Social World"), 1.0);
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
        assert_eq!(jaccard_similarity("a b c", "b c d"), 0.5);
        assert_eq!(jaccard_similarity("", ""), 0.0);
    }

    #[test]
    fn test_bag_of_words_strips_punctuation() {
        let bag = bag_of_words("Tversky, A., & Kahneman, D. (1974).");
        assert!(bag.contains("tversky"));
        assert!(bag.contains("kahneman"));
        assert!(bag.contains("1974"));
        assert!(!bag.contains("&"));
    }

    #[test]
    fn test_floor_char_boundary() {
        let text = "a¹b";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 3), 3);
        assert_eq!(floor_char_boundary(text, 99), text.len());
    }
}
