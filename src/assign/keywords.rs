//! Keyword extraction from citation context.

use crate::regex::Regex;
use itertools::Itertools;
use std::sync::LazyLock;

/// A capitalized-word run, optionally joined to a second name by `and`, `&`
/// or followed by `et al.`
static NAME_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b[A-Z][a-z'’\-]+(?:\s+[A-Z][a-z'’\-]+)*(?:\s+(?:and|&)\s+[A-Z][a-z'’\-]+|\s+et\s+al\.?)?",
    )
    .unwrap()
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());

static LOWERCASE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z][a-z'’\-]{2,}\b").unwrap());

const JOINERS: &[&str] = &["and", "&", "et", "al", "al."];

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "his",
    "was", "one", "our", "out", "has", "have", "this", "that", "with", "from", "they", "been",
    "were", "said", "each", "which", "their", "will", "other", "about", "many", "then", "them",
    "these", "some", "would", "into", "more", "also", "than", "its", "such", "only", "may",
    "under", "over", "between", "within", "after", "before", "when", "where", "while", "there",
    "what", "who", "how", "why", "very", "most", "much", "both", "through", "upon", "did",
    "does", "could", "should", "being", "those", "because", "however", "even", "just",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Keywords of `text`, lowercased and deduplicated in first-seen order.
///
/// Name runs come first (the whole run, then each name of a multi-word run),
/// then four-digit years, then lowercase words of three or more letters that
/// are not stop words.
pub(crate) fn extract_keywords(text: &str) -> Vec<String> {
    let names = NAME_RUN.find_iter(text).flat_map(|run| {
        let run = run.as_str().trim_end_matches('.');
        let words: Vec<&str> = run
            .split_whitespace()
            .filter(|word| !JOINERS.contains(word))
            .collect();
        let parts = if words.len() > 1 { words } else { Vec::new() };
        std::iter::once(run).chain(parts)
    });
    let years = YEAR.find_iter(text).map(|m| m.as_str());
    let words = LOWERCASE_WORD.find_iter(text).map(|m| m.as_str());

    names
        .chain(years)
        .chain(words)
        .map(str::to_lowercase)
        .filter(|keyword| !is_stop_word(keyword))
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords(
            "Tversky and Kahneman described heuristics of judgment under uncertainty in 1974 [].",
        );
        assert_eq!(
            keywords,
            vec![
                "tversky and kahneman",
                "tversky",
                "kahneman",
                "1974",
                "described",
                "heuristics",
                "judgment",
                "uncertainty",
            ]
        );
    }

    #[rstest]
    #[case("Smith et al. showed it", &["smith et al", "showed"])]
    #[case("Berger & Luckmann argued", &["berger & luckmann", "berger", "luckmann", "argued"])]
    #[case("The Social Construction", &["the social construction", "social", "construction"])]
    #[case("The data", &["data"])]
    #[case("", &[])]
    fn test_name_runs(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(extract_keywords(text), expected);
    }

    #[test]
    fn test_keywords_are_deduplicated() {
        let keywords = extract_keywords("Anchoring matters. anchoring matters 2001 2001");
        assert_eq!(keywords, vec!["anchoring", "2001", "matters"]);
    }
}
