//! Keyword scoring of references.

use crate::Reference;
use crate::utils::bag_of_words;
use std::collections::HashSet;

const TITLE_WEIGHT: f64 = 0.3;
const AUTHOR_WEIGHT: f64 = 0.2;
const YEAR_WEIGHT: f64 = 0.15;
const BAG_WEIGHT: f64 = 0.05;

/// The score of one reference against a keyword set.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredReference {
    /// Index into the scored reference slice
    pub(crate) index: usize,
    /// Normalized score in `[0, 1]`
    pub(crate) score: f64,
    pub(crate) title_match: bool,
    pub(crate) author_match: bool,
    pub(crate) year_match: bool,
}

impl ScoredReference {
    /// The fields that matched, in title, author, year order.
    pub(crate) fn matched_fields(&self) -> Vec<&'static str> {
        [
            (self.title_match, "title"),
            (self.author_match, "author"),
            (self.year_match, "year"),
        ]
        .into_iter()
        .filter_map(|(matched, field)| matched.then_some(field))
        .collect()
    }
}

/// Lowercased fields of a reference, prepared once per scoring pass.
struct PreparedReference {
    title: String,
    authors: String,
    year: String,
    year_digits: String,
    bag: HashSet<String>,
}

impl PreparedReference {
    fn new(reference: &Reference) -> Self {
        let full = format!(
            "{} {} {} {}",
            reference.authors, reference.year, reference.title, reference.publication
        );
        Self {
            title: reference.title.to_lowercase(),
            authors: reference.authors.to_lowercase(),
            year: reference.year.to_lowercase(),
            year_digits: reference.year_digits().to_string(),
            bag: bag_of_words(&full),
        }
    }
}

/// Scores `reference` against lowercase `keywords`.
///
/// Each keyword adds 0.3 for a title substring match, 0.2 for an authors
/// substring match, 0.15 for an exact year match and 0.05 when it appears in
/// the reference's bag of words. The sum is scaled by the fraction of
/// keywords that matched anything and clamped to `[0, 1]`.
fn score_prepared(index: usize, reference: &PreparedReference, keywords: &[String]) -> ScoredReference {
    let mut scored = ScoredReference {
        index,
        score: 0.0,
        title_match: false,
        author_match: false,
        year_match: false,
    };
    if keywords.is_empty() {
        return scored;
    }

    let mut raw = 0.0;
    let mut matched = 0usize;
    for keyword in keywords {
        let mut contribution = 0.0;
        if !reference.title.is_empty() && reference.title.contains(keyword.as_str()) {
            contribution += TITLE_WEIGHT;
            scored.title_match = true;
        }
        if !reference.authors.is_empty() && reference.authors.contains(keyword.as_str()) {
            contribution += AUTHOR_WEIGHT;
            scored.author_match = true;
        }
        if !reference.year.is_empty()
            && (*keyword == reference.year || *keyword == reference.year_digits)
        {
            contribution += YEAR_WEIGHT;
            scored.year_match = true;
        }
        if reference.bag.contains(keyword) {
            contribution += BAG_WEIGHT;
        }
        if contribution > 0.0 {
            raw += contribution;
            matched += 1;
        }
    }

    scored.score = (raw * matched as f64 / keywords.len() as f64).clamp(0.0, 1.0);
    scored
}

/// Scores every reference and keeps those at or above `threshold`, best first.
///
/// Ties keep bibliography order.
pub(crate) fn rank_references(
    references: &[Reference],
    keywords: &[String],
    threshold: f64,
) -> Vec<ScoredReference> {
    let mut ranked: Vec<ScoredReference> = references
        .iter()
        .enumerate()
        .map(|(index, reference)| score_prepared(index, &PreparedReference::new(reference), keywords))
        .filter(|scored| scored.score >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reference(rid: &str, authors: &str, year: &str, title: &str) -> Reference {
        Reference {
            rid: rid.to_string(),
            authors: authors.to_string(),
            year: year.to_string(),
            title: title.to_string(),
            publication: "Science.".to_string(),
            ..Default::default()
        }
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn score(reference: &Reference, words: &[&str]) -> ScoredReference {
        score_prepared(0, &PreparedReference::new(reference), &keywords(words))
    }

    #[test]
    fn test_weights_and_normalization() {
        let tversky = reference("101", "Tversky, A.", "1974", "Judgment under uncertainty");

        // title 0.3 + bag 0.05, one of two keywords matched
        let scored = score(&tversky, &["judgment", "unrelated"]);
        assert!((scored.score - 0.35 * 1.0 / 2.0).abs() < 1e-9);
        assert!(scored.title_match && !scored.author_match && !scored.year_match);

        // author 0.2 + bag 0.05 and year 0.15 + bag 0.05, both matched
        let scored = score(&tversky, &["tversky", "1974"]);
        assert!((scored.score - 0.45).abs() < 1e-9);
        assert_eq!(scored.matched_fields(), vec!["author", "year"]);
    }

    #[test]
    fn test_score_is_clamped() {
        let tversky = reference("101", "Tversky, A., & Kahneman, D.", "1974", "Judgment under uncertainty: Heuristics and biases");
        let scored = score(&tversky, &["tversky", "kahneman", "1974", "heuristics", "judgment", "uncertainty"]);
        assert_eq!(scored.score, 1.0);
    }

    #[test]
    fn test_year_suffix_matches_digits() {
        let smith = reference("3", "Smith, J.", "1999a", "Title");
        assert!(score(&smith, &["1999"]).year_match);
        assert!(score(&smith, &["1999a"]).year_match);
    }

    #[test]
    fn test_no_keywords_scores_zero() {
        let smith = reference("3", "Smith, J.", "1999", "Title");
        assert_eq!(score(&smith, &[]).score, 0.0);
    }

    #[test]
    fn test_rank_references_filters_and_orders() {
        let references = vec![
            reference("1", "Other, O.", "2001", "Unrelated work"),
            reference("2", "Tversky, A.", "1974", "Judgment under uncertainty"),
            reference("3", "Tversky, A.", "1980", "Judgment elsewhere"),
        ];
        let ranked = rank_references(&references, &keywords(&["tversky", "1974", "judgment"]), 0.3);

        let order: Vec<_> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 2]);
        assert!(ranked[0].score > ranked[1].score);
    }
}
