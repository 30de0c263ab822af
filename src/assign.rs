//! Resolution of unnumbered citations to reference identifiers.
//!
//! Each unnumbered citation is matched against the bibliography by keywords
//! drawn from its sentence and paragraph. The best reference clearing the
//! secondary threshold wins, and an RID is allocated from the range of the
//! chapter the citation sits in.
//!
//! # Example
//!
//! ```
//! use biblink::{
//!     AssignerConfig, CitationDetector, NoThrottle, ReferenceParser, RidAssigner,
//!     StructureAnalyzer,
//! };
//!
//! let manuscript = "Chapter 2: Construction\n\nBerger and Luckmann argued that reality is a social construction [].\n";
//! let bibliography = "[205] Berger, P. L., & Luckmann, T. (1966). The Social Construction of Reality. Doubleday.";
//!
//! let citations = CitationDetector::new().detect(manuscript).citations;
//! let structure = StructureAnalyzer::new().analyze(manuscript);
//! let references = ReferenceParser::new().parse(bibliography).references;
//!
//! let assigner = RidAssigner::new(AssignerConfig::default()).with_throttle(NoThrottle);
//! let assignments = assigner.assign_all(manuscript, &citations, &structure, &references);
//!
//! assert_eq!(assignments[0].assigned_rid, "205");
//! assert_eq!(assignments[0].chapter, 2);
//! ```

mod allocator;
mod config;
mod keywords;
mod score;
mod throttle;
mod validate;

pub use allocator::RidAllocator;
pub use config::{AssignerConfig, ChapterRanges, RidRange};
pub use throttle::{NoThrottle, SleepThrottle, Throttle};
pub use validate::{ValidationIssue, ValidationReport};

use crate::context::{CitationContext, ContextCapturer};
use crate::structure::DocumentStructure;
use crate::{Citation, Reference};
use keywords::extract_keywords;
use score::{ScoredReference, rank_references};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_CHAPTER: u32 = 1;

/// An RID chosen for an unnumbered citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidAssignment {
    /// The citation, enriched with its context windows
    pub citation: Citation,
    pub assigned_rid: String,
    /// Match score of the suggested reference, in `[0, 1]`
    pub confidence: f64,
    pub reason: String,
    /// Index of the matched reference in the slice passed to the assigner
    pub suggested_reference: usize,
    /// Chapter whose RID range was used
    pub chapter: u32,
}

impl RidAssignment {
    /// The matched reference, looked up in the slice used for the run.
    pub fn reference<'a>(&self, references: &'a [Reference]) -> Option<&'a Reference> {
        references.get(self.suggested_reference)
    }
}

/// Matches unnumbered citations to references and allocates their RIDs.
#[derive(Debug)]
pub struct RidAssigner {
    config: AssignerConfig,
    throttle: Arc<dyn Throttle>,
}

impl Default for RidAssigner {
    fn default() -> Self {
        Self::new(AssignerConfig::default())
    }
}

impl RidAssigner {
    /// Creates an assigner that sleeps `config.rate_limit_delay` between citations.
    #[must_use]
    pub fn new(config: AssignerConfig) -> Self {
        let throttle = Arc::new(SleepThrottle::new(config.rate_limit_delay));
        Self { config, throttle }
    }

    /// Replaces the pause taken between citations.
    #[must_use]
    pub fn with_throttle(self, throttle: impl Throttle + 'static) -> Self {
        self.with_shared_throttle(Arc::new(throttle))
    }

    #[must_use]
    pub(crate) fn with_shared_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    fn capturer(&self) -> ContextCapturer {
        ContextCapturer::new().with_window_size(self.config.window_size)
    }

    /// Resolves one citation, claiming its RID from `allocator`.
    ///
    /// Returns `None` when no reference clears the secondary threshold or no
    /// RID is left to hand out.
    pub fn assign(
        &self,
        text: &str,
        citation: &Citation,
        structure: &DocumentStructure,
        references: &[Reference],
        allocator: &mut RidAllocator,
    ) -> Option<RidAssignment> {
        let context = self.capturer().capture(text, citation);
        self.assign_in_context(context, structure, references, allocator)
    }

    fn assign_in_context(
        &self,
        context: CitationContext,
        structure: &DocumentStructure,
        references: &[Reference],
        allocator: &mut RidAllocator,
    ) -> Option<RidAssignment> {
        let keywords = extract_keywords(&format!("{} {}", context.sentence, context.paragraph));
        let ranked = rank_references(references, &keywords, self.config.secondary_threshold);

        let Some(best) = ranked.first() else {
            debug!(
                position = context.citation.position,
                keywords = keywords.len(),
                "no reference cleared the secondary threshold"
            );
            return None;
        };

        let chapter = structure
            .chapter_at(context.citation.position)
            .unwrap_or(DEFAULT_CHAPTER);
        let range = self.config.chapter_ranges.range_for(chapter);
        let preferred = references.get(best.index).map(|r| r.rid.as_str());

        let Some(assigned_rid) = allocator.allocate(preferred, range) else {
            warn!(
                position = context.citation.position,
                chapter, "no RID left to allocate"
            );
            return None;
        };

        Some(RidAssignment {
            citation: context.citation,
            assigned_rid,
            confidence: best.score,
            reason: self.reason(best),
            suggested_reference: best.index,
            chapter,
        })
    }

    fn reason(&self, best: &ScoredReference) -> String {
        let tier = if best.score >= self.config.primary_threshold {
            "Primary"
        } else {
            "Secondary"
        };
        let fields = best.matched_fields();
        if fields.is_empty() {
            format!("{} match ({:.2}): General keyword match", tier, best.score)
        } else {
            format!("{} match ({:.2}): matched {}", tier, best.score, fields.join(", "))
        }
    }

    /// Resolves every unnumbered citation in document order.
    ///
    /// Numbered citations are skipped. One [`RidAllocator`] seeded with the
    /// bibliography's RIDs is threaded through the run, so no two returned
    /// assignments share an RID. The throttle pauses between citations.
    pub fn assign_all(
        &self,
        text: &str,
        citations: &[Citation],
        structure: &DocumentStructure,
        references: &[Reference],
    ) -> Vec<RidAssignment> {
        let mut allocator = RidAllocator::new(references);
        let mut pending: Vec<&Citation> = citations.iter().filter(|c| !c.is_numbered()).collect();
        pending.sort_by_key(|citation| citation.position);

        let capturer = self.capturer();
        let mut assignments = Vec::new();
        for (index, citation) in pending.iter().enumerate() {
            if index > 0 {
                self.throttle.pause();
            }
            let context = capturer.capture(text, citation);
            match self.assign_in_context(context, structure, references, &mut allocator) {
                Some(assignment) => assignments.push(assignment),
                None => warn!(
                    position = citation.position,
                    line = citation.line_number,
                    "citation left unresolved"
                ),
            }
        }

        info!(
            unnumbered = pending.len(),
            assigned = assignments.len(),
            "assigned reference identifiers"
        );
        assignments
    }

    /// Checks `assignments` for RID collisions, low confidence and chapter
    /// mismatches.
    pub fn validate(&self, assignments: &[RidAssignment]) -> ValidationReport {
        validate::validate_assignments(assignments, self.config.secondary_threshold)
    }
}
