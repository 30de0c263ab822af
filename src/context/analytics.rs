//! Aggregate views over a manuscript's citations.

use crate::Citation;
use crate::context::boundaries::{paragraph_count, sentence_count};
use serde::{Deserialize, Serialize};

/// How densely a text is cited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitationDensity {
    pub paragraphs: usize,
    pub sentences: usize,
    /// Citations per paragraph, 0.0 for a text without paragraphs
    pub per_paragraph: f64,
    /// Citations per sentence, 0.0 for a text without sentences
    pub per_sentence: f64,
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Computes citation density over `text`.
pub fn citation_density(text: &str, citations: &[Citation]) -> CitationDensity {
    let paragraphs = paragraph_count(text);
    let sentences = sentence_count(text);
    CitationDensity {
        paragraphs,
        sentences,
        per_paragraph: ratio(citations.len(), paragraphs),
        per_sentence: ratio(citations.len(), sentences),
    }
}

/// Groups citations whose markers start within `max_distance` bytes of the
/// previous one.
///
/// Only groups of two or more citations are returned, in document order.
pub fn cluster_citations(citations: &[Citation], max_distance: usize) -> Vec<Vec<&Citation>> {
    let mut sorted: Vec<&Citation> = citations.iter().collect();
    sorted.sort_by_key(|citation| citation.position);

    let mut clusters: Vec<Vec<&Citation>> = Vec::new();
    let mut current: Vec<&Citation> = Vec::new();
    for citation in sorted {
        let close = current
            .last()
            .is_some_and(|last| citation.position - last.position <= max_distance);
        if !close && !current.is_empty() {
            clusters.push(std::mem::take(&mut current));
        }
        current.push(citation);
    }
    clusters.push(current);

    clusters.retain(|cluster| cluster.len() >= 2);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CitationDetector;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_citation_density() {
        let text = "First claim [1]. Second claim [2].\n\nThird claim [3]. Unsupported.";
        let citations = CitationDetector::new().detect(text).citations;
        let density = citation_density(text, &citations);

        assert_eq!(density.paragraphs, 2);
        assert_eq!(density.sentences, 4);
        assert!((density.per_paragraph - 1.5).abs() < f64::EPSILON);
        assert!((density.per_sentence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_density_of_empty_text() {
        let density = citation_density("", &[]);
        assert_eq!(density.paragraphs, 0);
        assert_eq!(density.per_paragraph, 0.0);
        assert_eq!(density.per_sentence, 0.0);
    }

    #[test]
    fn test_cluster_citations() {
        let text = "Many agree [1] [2] [3]. Much later in the text someone else [9]. Then [] [].";
        let citations = CitationDetector::new().detect(text).citations;
        let clusters = cluster_citations(&citations, 5);

        let texts: Vec<Vec<&str>> = clusters
            .iter()
            .map(|cluster| cluster.iter().map(|c| c.original_text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["[1]", "[2]", "[3]"], vec!["[]", "[]"]]);
    }

    #[test]
    fn test_cluster_without_citations() {
        assert!(cluster_citations(&[], 10).is_empty());
    }
}
