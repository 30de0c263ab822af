//! Bibliography parsing.
//!
//! Parses a plain-text bibliography where every entry starts with a `[rid]`
//! marker:
//!
//! ```text
//! [7] Berger, P. L., & Luckmann, T. (1966). The Social Construction of Reality. Doubleday.
//! ```
//!
//! Entries may continue over several lines and may carry identifiers (`DOI:`,
//! `ISBN:`, `URL:`), a `[VERIFIED]` marker and workflow annotations
//! (`FLAGS[...]`, `PRIMARY_URL[...]`, `Relevance:`, `Q:` lines), which are
//! moved into [`ReferenceMetadata`](crate::ReferenceMetadata).
//!
//! # Example
//!
//! ```
//! use biblink::ReferenceParser;
//!
//! let input = "[7] Berger, P. L., & Luckmann, T. (1966). The Social Construction of Reality. Doubleday.\n\
//!              [8] (1999).";
//!
//! let result = ReferenceParser::new().parse(input);
//! assert_eq!(result.total, 2);
//! assert_eq!(result.references[0].authors, "Berger, P. L., & Luckmann, T.");
//! assert_eq!(result.failures[0].line_number, 2);
//! ```

mod metadata;
mod parse;
mod split;
mod summary;

pub use summary::ReferenceSummary;

use crate::Reference;
use crate::utils::jaccard_similarity;
use serde::{Deserialize, Serialize};
use split::split_entries;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons a single bibliography entry could not be decomposed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Entry has no [rid] marker")]
    MissingRid,

    #[error("Entry has no content after its marker")]
    EmptyEntry,

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// An entry that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    /// 1-indexed line where the entry starts
    pub line_number: usize,
    pub text: String,
    pub error: String,
}

/// Parsed references plus the entries that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingResult {
    pub references: Vec<Reference>,
    pub failures: Vec<ParseFailure>,
    /// Number of entries found, parsed or not
    pub total: usize,
}

impl ParsingResult {
    /// Looks up a reference by RID.
    pub fn find(&self, rid: &str) -> Option<&Reference> {
        self.references.iter().find(|reference| reference.rid == rid)
    }
}

/// Parser for `[rid]`-prefixed bibliographies.
#[derive(Debug, Clone, Default)]
pub struct ReferenceParser;

impl ReferenceParser {
    /// Creates a new reference parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses `input` into references.
    ///
    /// Never fails as a whole: each malformed entry becomes a [`ParseFailure`]
    /// and parsing continues with the next one.
    pub fn parse(&self, input: &str) -> ParsingResult {
        let segmented = split_entries(input);
        if !segmented.ignored_lines.is_empty() {
            debug!(
                count = segmented.ignored_lines.len(),
                "ignored lines outside bibliography entries"
            );
        }

        let mut result = ParsingResult {
            total: segmented.entries.len(),
            ..Default::default()
        };

        for entry in segmented.entries {
            let line_number = entry.line_number;
            let text = entry.text();
            match Reference::try_from(entry) {
                Ok(reference) => result.references.push(reference),
                Err(error) => {
                    warn!(line_number, %error, "failed to parse bibliography entry");
                    result.failures.push(ParseFailure {
                        line_number,
                        text,
                        error: error.to_string(),
                    });
                }
            }
        }

        debug!(
            parsed = result.references.len(),
            failed = result.failures.len(),
            "parsed bibliography"
        );
        result
    }
}

/// Ranks references by Jaccard similarity between `query` and their titles.
///
/// Every reference is returned, best match first; ties keep bibliography order.
///
/// # Examples
///
/// ```
/// use biblink::references::rank_by_title;
/// use biblink::ReferenceParser;
///
/// let parsed = ReferenceParser::new().parse(
///     "[1] A (2000). Thinking fast and slow. P.\n[2] B (2001). Judgment under uncertainty. P.",
/// );
/// let ranked = rank_by_title(&parsed.references, "judgment under uncertainty");
/// assert_eq!(ranked[0].0.rid, "2");
/// assert_eq!(ranked[0].1, 1.0);
/// ```
pub fn rank_by_title<'a>(references: &'a [Reference], query: &str) -> Vec<(&'a Reference, f64)> {
    let mut ranked: Vec<_> = references
        .iter()
        .map(|reference| (reference, jaccard_similarity(query, &reference.title)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
