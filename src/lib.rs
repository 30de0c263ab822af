//! A library for analysing manuscripts and resolving their inline citations.
//!
//! `biblink` takes the text of a manuscript and the text of its bibliography and
//! turns inline citation markers into resolved reference identifiers (RIDs).
//!
//! # Key Features
//!
//! - **Citation Detection**: Recognizes many inline notations:
//!   - Bracketed and parenthetical numbers, ranges and lists (`[3]`, `[4-6]`, `(7, 8)`)
//!   - Empty markers awaiting resolution (`[]`)
//!   - Unicode superscripts, author-year pairs, symbols and letters
//!
//! - **Document Structure**: Chapters, numbered sections and headings folded
//!   into a section tree with position-accurate boundaries
//!
//! - **Context Capture**: Sentence, paragraph and fixed-window context around
//!   each citation, with abbreviation-aware sentence splitting
//!
//! - **Bibliography Parsing**: `[rid] Authors (Year). Title. Publication.` entries
//!   with DOI/ISBN/URL metadata and per-entry failure isolation
//!
//! - **RID Assignment**: Keyword-scored matching of unnumbered citations to
//!   references with chapter-based RID ranges
//!
//! # Basic Usage
//!
//! ```rust
//! use biblink::{Analyzer, NoThrottle};
//!
//! let manuscript = "Chapter 1: Judgment\n\nTversky and Kahneman described heuristics of judgment under uncertainty in 1974 [].\n";
//! let bibliography = "[101] Tversky, A., & Kahneman, D. (1974). Judgment under uncertainty: Heuristics and biases. Science.";
//!
//! let analyzer = Analyzer::new().with_throttle(NoThrottle);
//! let result = analyzer.analyze(manuscript, bibliography).unwrap();
//!
//! assert_eq!(result.statistics.unnumbered_citations, 1);
//! assert_eq!(result.assignments[0].assigned_rid, "101");
//! ```
//!
//! # Working with individual components
//!
//! ```rust
//! use biblink::{CitationDetector, ReferenceParser};
//!
//! let detection = CitationDetector::new().detect("As shown before [2-4].");
//! assert_eq!(detection.citations.len(), 3);
//!
//! let parsed = ReferenceParser::new().parse("[2] Doe, J. (2001). A Title. Press.");
//! assert_eq!(parsed.references[0].title, "A Title");
//! ```
//!
//! # Error Handling
//!
//! Text analysis never fails: malformed citation markers are skipped and
//! malformed bibliography entries are reported in [`ParsingResult::failures`].
//! The only error surfaced through [`Result`] is an invalid configuration:
//!
//! ```rust
//! use biblink::{Analyzer, AnalysisError, AssignerConfig};
//!
//! let config = AssignerConfig {
//!     primary_threshold: 0.3,
//!     secondary_threshold: 0.6,
//!     ..Default::default()
//! };
//! let result = Analyzer::new().with_config(config).analyze("", "");
//! assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
//! ```
//!
//! # Determinism
//!
//! Detection, structure analysis, context capture and bibliography parsing are
//! pure. RID assignment walks citations in document order and threads a single
//! [`RidAllocator`] through the run, so the first citation always wins the
//! lowest free RID.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod assign;
pub mod context;
pub mod detect;
pub mod pipeline;
mod regex;
pub mod references;
pub mod structure;
mod utils;

// Reexports
pub use assign::{
    AssignerConfig, ChapterRanges, NoThrottle, RidAllocator, RidAssigner, RidAssignment,
    RidRange, SleepThrottle, Throttle, ValidationIssue, ValidationReport,
};
pub use context::{CitationContext, ContextCapturer};
pub use detect::{CitationDetector, DetectionResult, LineDetector, LineMatch};
pub use pipeline::{AnalysisResult, AnalysisStatistics, Analyzer};
pub use references::{ParseFailure, ParsingResult, ReferenceParser, ReferenceSummary};
pub use structure::{DocumentStructure, Section, StructureAnalyzer};

/// A specialized Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Represents errors that can occur while configuring or running an analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: String, message: String },
}

/// Whether a citation already carries an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CitationKind {
    /// The marker names its reference, e.g. `[12]` or `(Smith 2001)`.
    Numbered,
    /// The marker is empty (`[]`) and needs an RID assigned.
    Unnumbered,
}

/// An inline citation marker found in a manuscript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Identifier copied from the marker; empty for unnumbered citations
    pub id: String,
    /// Byte offset of the marker in the manuscript
    pub position: usize,
    /// 1-indexed line of the marker
    pub line_number: usize,
    /// 1-indexed character column of the marker
    pub column_number: usize,
    /// The marker exactly as it appears in the text
    pub original_text: String,
    /// Window of text preceding the marker, filled by [`ContextCapturer`]
    pub context_before: String,
    /// Window of text starting at the marker, filled by [`ContextCapturer`]
    pub context_after: String,
    pub kind: CitationKind,
}

impl Citation {
    /// Returns true if the citation already carries an identifier.
    pub fn is_numbered(&self) -> bool {
        self.kind == CitationKind::Numbered
    }

    /// Byte offset just past the end of the marker.
    pub fn end_position(&self) -> usize {
        self.position + self.original_text.len()
    }
}

/// Metadata stripped from a bibliography entry before it is decomposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    /// Digital Object Identifier, normalized to lowercase
    pub doi: Option<String>,
    pub isbn: Option<String>,
    /// Primary (or unlabelled) URL
    pub url: Option<String>,
    pub secondary_url: Option<String>,
    pub tertiary_url: Option<String>,
    /// Set when the entry carries a `[VERIFIED]` marker
    pub verified: bool,
    /// Workflow flags from a `FLAGS[...]` annotation
    pub flags: Vec<String>,
    /// Free-text relevance note from a `Relevance:` clause
    pub relevance: Option<String>,
    /// Search queries from `Q:` lines
    pub queries: Vec<String>,
}

impl ReferenceMetadata {
    /// Returns true if the entry is flagged `FINALIZED`.
    pub fn is_finalized(&self) -> bool {
        self.flags.iter().any(|flag| flag == "FINALIZED")
    }
}

/// A structured bibliography entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference identifier from the leading `[digits]` marker
    pub rid: String,
    /// Author list exactly as written
    pub authors: String,
    /// Publication year, including any disambiguating letter (`1999a`)
    pub year: String,
    pub title: String,
    pub publication: String,
    /// The entry text as it appeared in the bibliography
    pub raw_text: String,
    pub metadata: ReferenceMetadata,
}

impl Reference {
    /// The RID as a number, if it is numeric.
    pub fn rid_number(&self) -> Option<u32> {
        self.rid.parse().ok()
    }

    /// The four-digit year without any disambiguating suffix.
    pub fn year_digits(&self) -> &str {
        self.year.get(..4).unwrap_or(&self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_display() {
        let error = AnalysisError::InvalidConfig("empty chapter range".to_string());
        assert_eq!(error.to_string(), "Invalid configuration: empty chapter range");

        let error = AnalysisError::InvalidFieldValue {
            field: "primary_threshold".to_string(),
            message: "must be within [0, 1]".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid field value: primary_threshold - must be within [0, 1]"
        );
    }

    #[test]
    fn test_reference_year_digits() {
        let reference = Reference {
            year: "1999a".to_string(),
            ..Default::default()
        };
        assert_eq!(reference.year_digits(), "1999");

        let reference = Reference::default();
        assert_eq!(reference.year_digits(), "");
    }

    #[test]
    fn test_metadata_finalized() {
        let metadata = ReferenceMetadata {
            flags: vec!["STALE".to_string(), "FINALIZED".to_string()],
            ..Default::default()
        };
        assert!(metadata.is_finalized());
        assert!(!ReferenceMetadata::default().is_finalized());
    }
}
