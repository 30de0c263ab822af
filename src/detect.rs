//! Inline citation detection.
//!
//! The manuscript is scanned line by line. Every line is offered to each
//! [`LineDetector`] in turn and all of their matches are kept, so a marker that
//! satisfies two recognizers is reported twice. Detection never fails:
//! malformed range or list bounds are skipped.
//!
//! # Example
//!
//! ```
//! use biblink::{CitationDetector, CitationKind};
//!
//! let result = CitationDetector::new().detect("First [1].\nThen [5, 6; 7] and [].");
//! assert_eq!(result.citations.len(), 5);
//! assert_eq!(result.numbered_count, 4);
//! assert_eq!(result.unnumbered_count, 1);
//! assert_eq!(result.citations[4].kind, CitationKind::Unnumbered);
//! ```

mod patterns;

use crate::{Citation, CitationKind};
use patterns::{
    AuthorYearDetector, EnclosedNumberDetector, LetterDetector, SuperscriptDetector,
    SymbolDetector,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A citation marker found within a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// Byte offset of the marker within the line
    pub start: usize,
    /// The marker text shared by every id expanded from it
    pub original_text: String,
    pub id: String,
    pub kind: CitationKind,
}

/// Trait for implementing single-notation citation recognizers.
pub trait LineDetector: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns every marker of this notation found in `line`.
    ///
    /// `line` never contains the trailing newline.
    fn detect_line(&self, line: &str) -> Vec<LineMatch>;
}

/// Ordered citations found in a manuscript, with summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub citations: Vec<Citation>,
    pub numbered_count: usize,
    pub unnumbered_count: usize,
    /// Distinct numeric ids among numbered citations
    pub unique_ids: BTreeSet<String>,
}

impl DetectionResult {
    pub fn total(&self) -> usize {
        self.citations.len()
    }

    /// Citations that still need an RID.
    pub fn unnumbered(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter().filter(|c| !c.is_numbered())
    }
}

/// Scans manuscripts with an ordered list of [`LineDetector`]s.
pub struct CitationDetector {
    detectors: Vec<Box<dyn LineDetector>>,
}

impl fmt::Debug for CitationDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CitationDetector")
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for CitationDetector {
    fn default() -> Self {
        Self::with_detectors(standard_detectors())
    }
}

/// The recognizers applied by [`CitationDetector::new`], in order.
pub fn standard_detectors() -> Vec<Box<dyn LineDetector>> {
    vec![
        Box::new(EnclosedNumberDetector::bracketed()),
        Box::new(EnclosedNumberDetector::parenthetical()),
        Box::new(SuperscriptDetector),
        Box::new(AuthorYearDetector),
        Box::new(SymbolDetector),
        Box::new(LetterDetector),
    ]
}

impl CitationDetector {
    /// Creates a detector with the standard recognizers.
    ///
    /// # Examples
    ///
    /// ```
    /// use biblink::CitationDetector;
    /// let detector = CitationDetector::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector applying exactly `detectors`, in order.
    #[must_use]
    pub fn with_detectors(detectors: Vec<Box<dyn LineDetector>>) -> Self {
        Self { detectors }
    }

    /// Detects every citation in `text`.
    ///
    /// Citations are ordered by line, then by column. Markers matched by more
    /// than one recognizer appear once per recognizer.
    pub fn detect(&self, text: &str) -> DetectionResult {
        let mut result = DetectionResult::default();
        let mut offset = 0;

        for (index, raw_line) in text.split_inclusive('\n').enumerate() {
            let line = raw_line.trim_end_matches(['\n', '\r']);

            let mut matches: Vec<LineMatch> = self
                .detectors
                .iter()
                .flat_map(|detector| detector.detect_line(line))
                .collect();
            matches.sort_by_key(|m| m.start);

            for m in matches {
                match m.kind {
                    CitationKind::Numbered => {
                        result.numbered_count += 1;
                        if m.id.chars().all(|c| c.is_ascii_digit()) {
                            result.unique_ids.insert(m.id.clone());
                        }
                    }
                    CitationKind::Unnumbered => result.unnumbered_count += 1,
                }

                result.citations.push(Citation {
                    id: m.id,
                    position: offset + m.start,
                    line_number: index + 1,
                    column_number: line[..m.start].chars().count() + 1,
                    original_text: m.original_text,
                    context_before: String::new(),
                    context_after: String::new(),
                    kind: m.kind,
                });
            }

            offset += raw_line.len();
        }

        debug!(
            total = result.citations.len(),
            numbered = result.numbered_count,
            unnumbered = result.unnumbered_count,
            "citation detection complete"
        );
        result
    }
}
