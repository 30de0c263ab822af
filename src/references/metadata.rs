//! Extraction of identifiers and workflow annotations from an entry.
//!
//! Every recognized piece is moved into [`ReferenceMetadata`] and removed from
//! the working text, so URLs and flags never leak into authors or titles.

use crate::ReferenceMetadata;
use crate::regex::{Captures, Regex};
use crate::utils::format_doi;
use std::sync::LazyLock;
use tracing::debug;

static DOI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bDOI:\s*(10\.\S+)").unwrap());

static ISBN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bISBN:\s*([0-9Xx][0-9Xx-]*[0-9Xx])").unwrap());

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(primary|secondary|tertiary)\s+)?URL:\s*(https?://\S+)").unwrap()
});

static VERIFIED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\[VERIFIED\]").unwrap());

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][A-Z_]*[A-Z])\[([^\]]*)\]").unwrap());

static RELEVANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bRelevance:\s*(.*)$").unwrap());

/// Which URL slot a labelled URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlSlot {
    Primary,
    Secondary,
    Tertiary,
}

impl UrlSlot {
    fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "secondary" | "secondary_url" => Self::Secondary,
            "tertiary" | "tertiary_url" => Self::Tertiary,
            _ => Self::Primary,
        }
    }

    fn field<'a>(&self, metadata: &'a mut ReferenceMetadata) -> &'a mut Option<String> {
        match self {
            Self::Primary => &mut metadata.url,
            Self::Secondary => &mut metadata.secondary_url,
            Self::Tertiary => &mut metadata.tertiary_url,
        }
    }
}

/// Stores `value` in `slot` unless it already holds a value.
fn fill(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

/// Removes every match of `regex` from `text`, handing each match to `on_match`.
fn strip(text: &str, regex: &Regex, mut on_match: impl FnMut(&Captures<'_>)) -> String {
    for caps in regex.captures_iter(text) {
        on_match(&caps);
    }
    regex.replace_all(text, " ").into_owned()
}

/// Splits entry lines into the working text and its metadata.
///
/// `Q:` and `Relevance:` lines are consumed whole; the remaining lines are
/// joined with spaces before the inline patterns are stripped.
pub(crate) fn extract_metadata(lines: &[&str]) -> (String, ReferenceMetadata) {
    let mut metadata = ReferenceMetadata::default();
    let mut kept = Vec::with_capacity(lines.len());

    for line in lines {
        if let Some(query) = line.strip_prefix("Q:") {
            let query = query.trim();
            if !query.is_empty() {
                metadata.queries.push(query.to_string());
            }
        } else if let Some(relevance) = line.strip_prefix("Relevance:") {
            fill(&mut metadata.relevance, relevance);
        } else {
            kept.push(*line);
        }
    }
    let text = kept.join(" ");

    let text = strip(&text, &DOI, |caps| {
        if metadata.doi.is_none() {
            metadata.doi = format_doi(&caps[1]);
        }
    });
    let text = strip(&text, &ISBN, |caps| fill(&mut metadata.isbn, &caps[1]));
    let text = strip(&text, &URL, |caps| {
        let slot = caps
            .get(1)
            .map_or(UrlSlot::Primary, |label| UrlSlot::from_label(label.as_str()));
        fill(slot.field(&mut metadata), &caps[2]);
    });
    let text = strip(&text, &VERIFIED, |_| metadata.verified = true);
    let text = strip(&text, &ANNOTATION, |caps| match &caps[1] {
        "FLAGS" => metadata
            .flags
            .extend(caps[2].split_whitespace().map(str::to_string)),
        name @ ("PRIMARY_URL" | "SECONDARY_URL" | "TERTIARY_URL") => {
            fill(UrlSlot::from_label(name).field(&mut metadata), &caps[2]);
        }
        other => debug!(annotation = other, "dropping unrecognized annotation"),
    });
    let text = strip(&text, &RELEVANCE, |caps| fill(&mut metadata.relevance, &caps[1]));

    if metadata.doi.is_none() {
        metadata.doi = metadata
            .url
            .as_deref()
            .filter(|url| url.contains("doi.org/"))
            .and_then(format_doi);
    }

    (text, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalized(text: &str) -> String {
        crate::utils::normalize_whitespace(text)
    }

    #[test]
    fn test_identifiers_are_stripped() {
        let (text, metadata) = extract_metadata(&[
            "[1] Doe, J. (2001). A Title. Press. DOI: 10.1000/ABC.123. ISBN: 978-0-385-05898-3",
            "URL: https://example.org/a Secondary URL: https://example.org/b [VERIFIED]",
        ]);

        assert_eq!(normalized(&text), "[1] Doe, J. (2001). A Title. Press.");
        assert_eq!(metadata.doi.as_deref(), Some("10.1000/abc.123"));
        assert_eq!(metadata.isbn.as_deref(), Some("978-0-385-05898-3"));
        assert_eq!(metadata.url.as_deref(), Some("https://example.org/a"));
        assert_eq!(metadata.secondary_url.as_deref(), Some("https://example.org/b"));
        assert!(metadata.verified);
    }

    #[test]
    fn test_workflow_annotations() {
        let (text, metadata) = extract_metadata(&[
            "[102] Kahneman, D. (2011). Thinking, Fast and Slow. Farrar. FLAGS[FINALIZED STALE] PRIMARY_URL[https://a.example/book] SECONDARY_URL[https://b.example/review] TERTIARY_URL[]",
            "Relevance: Foundational account of dual-process theory.",
            "Q: kahneman thinking fast and slow",
            "Q: dual process theory review",
        ]);

        assert_eq!(
            normalized(&text),
            "[102] Kahneman, D. (2011). Thinking, Fast and Slow. Farrar."
        );
        assert_eq!(metadata.flags, vec!["FINALIZED", "STALE"]);
        assert!(metadata.is_finalized());
        assert_eq!(metadata.url.as_deref(), Some("https://a.example/book"));
        assert_eq!(metadata.secondary_url.as_deref(), Some("https://b.example/review"));
        assert_eq!(metadata.tertiary_url, None);
        assert_eq!(
            metadata.relevance.as_deref(),
            Some("Foundational account of dual-process theory.")
        );
        assert_eq!(
            metadata.queries,
            vec!["kahneman thinking fast and slow", "dual process theory review"]
        );
    }

    #[test]
    fn test_inline_relevance_clause() {
        let (text, metadata) =
            extract_metadata(&["[5] . Relevance: Sets up the argument. PRIMARY_URL[https://x.example]"]);
        assert_eq!(normalized(&text), "[5] .");
        assert_eq!(metadata.relevance.as_deref(), Some("Sets up the argument."));
        assert_eq!(metadata.url.as_deref(), Some("https://x.example"));
    }

    #[test]
    fn test_doi_from_url() {
        let (_, metadata) = extract_metadata(&["[9] Title. URL: https://doi.org/10.1126/science.185.4157.1124"]);
        assert_eq!(metadata.doi.as_deref(), Some("10.1126/science.185.4157.1124"));
    }

    #[test]
    fn test_first_value_wins() {
        let (_, metadata) = extract_metadata(&[
            "[4] T. URL: https://first.example PRIMARY_URL[https://second.example]",
        ]);
        assert_eq!(metadata.url.as_deref(), Some("https://first.example"));
    }
}
