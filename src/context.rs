//! Context capture around citations.
//!
//! For every citation the capturer extracts the enclosing sentence and
//! paragraph and a fixed-size character window on either side of the marker.
//!
//! # Example
//!
//! ```
//! use biblink::{CitationDetector, ContextCapturer};
//!
//! let text = "Background first.\n\nDr. Smith found an effect []. It held up.";
//! let citations = CitationDetector::new().detect(text).citations;
//!
//! let contexts = ContextCapturer::new().capture_all(text, &citations);
//! assert_eq!(contexts[0].sentence, "Dr. Smith found an effect [].");
//! assert_eq!(contexts[0].words_before, 5);
//! ```

mod analytics;
mod boundaries;

pub use analytics::{CitationDensity, citation_density, cluster_citations};
pub(crate) use boundaries::{paragraph_bounds, sentence_bounds};

use crate::Citation;
use crate::utils::{count_words, floor_char_boundary};
use serde::{Deserialize, Serialize};

const DEFAULT_WINDOW_SIZE: usize = 200;

/// A citation together with the text surrounding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationContext {
    /// The citation with `context_before`/`context_after` filled in
    pub citation: Citation,
    pub sentence: String,
    pub paragraph: String,
    /// Words in the sentence before the marker
    pub words_before: usize,
    /// Words in the sentence after the marker
    pub words_after: usize,
}

/// Extracts sentence, paragraph and window context for citations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCapturer {
    window_size: usize,
}

impl Default for ContextCapturer {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl ContextCapturer {
    /// Creates a capturer with a 200 character window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of characters captured on each side of a citation.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Captures the context of a single citation.
    pub fn capture(&self, text: &str, citation: &Citation) -> CitationContext {
        let position = floor_char_boundary(text, citation.position);
        let marker_end = floor_char_boundary(text, citation.end_position());

        let (paragraph_start, paragraph_end) = paragraph_bounds(text, position);
        let (sentence_start, sentence_end) = sentence_bounds(text, position);
        // A sentence never spans a blank line
        let sentence_start = sentence_start.max(paragraph_start);
        let sentence_end = sentence_end.min(paragraph_end).max(sentence_start);

        let words_before = count_words(&text[sentence_start.min(position)..position]);
        let words_after = count_words(&text[marker_end.min(sentence_end)..sentence_end]);

        let citation = Citation {
            context_before: window_before(text, position, self.window_size).to_string(),
            context_after: window_after(text, position, self.window_size).to_string(),
            ..citation.clone()
        };

        CitationContext {
            citation,
            sentence: text[sentence_start..sentence_end].trim().to_string(),
            paragraph: text[paragraph_start..paragraph_end].trim().to_string(),
            words_before,
            words_after,
        }
    }

    /// Captures the context of every citation, preserving order.
    pub fn capture_all(&self, text: &str, citations: &[Citation]) -> Vec<CitationContext> {
        citations
            .iter()
            .map(|citation| self.capture(text, citation))
            .collect()
    }
}

/// Up to `size` characters ending at `position`.
fn window_before(text: &str, position: usize, size: usize) -> &str {
    if size == 0 {
        return "";
    }
    let head = &text[..position];
    let start = head
        .char_indices()
        .rev()
        .nth(size - 1)
        .map_or(0, |(index, _)| index);
    &head[start..]
}

/// Up to `size` characters starting at `position`.
fn window_after(text: &str, position: usize, size: usize) -> &str {
    let tail = &text[position..];
    let end = tail
        .char_indices()
        .nth(size)
        .map_or(tail.len(), |(index, _)| index);
    &tail[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CitationDetector;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "\
Opening paragraph sets the scene.

Kahneman and Tversky (1974) showed anchoring effects [] in estimates. A second sentence follows.

Closing words.";

    fn first_unnumbered(text: &str) -> Citation {
        CitationDetector::new()
            .detect(text)
            .unnumbered()
            .next()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_capture_sentence_and_paragraph() {
        let citation = first_unnumbered(TEXT);
        let context = ContextCapturer::new().capture(TEXT, &citation);

        assert_eq!(
            context.sentence,
            "Kahneman and Tversky (1974) showed anchoring effects [] in estimates."
        );
        assert_eq!(
            context.paragraph,
            "Kahneman and Tversky (1974) showed anchoring effects [] in estimates. A second sentence follows."
        );
        assert_eq!(context.words_before, 7);
        assert_eq!(context.words_after, 2);
    }

    #[test]
    fn test_capture_windows() {
        let citation = first_unnumbered(TEXT);
        let context = ContextCapturer::new()
            .with_window_size(10)
            .capture(TEXT, &citation);

        assert_eq!(context.citation.context_before, "g effects ");
        assert_eq!(context.citation.context_after, "[] in esti");
        assert_eq!(context.citation.position, citation.position);
        assert_eq!(citation.context_before, "");
    }

    #[test]
    fn test_windows_clamp_to_text() {
        let text = "Tiny ¹ text";
        let citation = CitationDetector::new().detect(text).citations[0].clone();
        let context = ContextCapturer::new().capture(text, &citation);

        assert_eq!(context.citation.context_before, "Tiny ");
        assert_eq!(context.citation.context_after, "¹ text");

        let context = ContextCapturer::new()
            .with_window_size(0)
            .capture(text, &citation);
        assert_eq!(context.citation.context_before, "");
        assert_eq!(context.citation.context_after, "");
    }

    #[test]
    fn test_sentence_stops_at_paragraph_break() {
        let text = "Chapter 1: Judgment\n\nHeuristics guide judgment [] often";
        let citation = first_unnumbered(text);
        let context = ContextCapturer::new().capture(text, &citation);

        assert_eq!(context.sentence, "Heuristics guide judgment [] often");
        assert_eq!(context.paragraph, context.sentence);
        assert_eq!(context.words_before, 3);
        assert_eq!(context.words_after, 1);
    }

    #[test]
    fn test_capture_all_preserves_order() {
        let text = "One [1]. Two [2].";
        let citations = CitationDetector::new().detect(text).citations;
        let contexts = ContextCapturer::new().capture_all(text, &citations);

        let sentences: Vec<_> = contexts.iter().map(|c| c.sentence.as_str()).collect();
        assert_eq!(sentences, vec!["One [1].", "Two [2]."]);
        assert_eq!(ContextCapturer::new().window_size(), 200);
    }
}
