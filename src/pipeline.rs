//! End-to-end analysis of a manuscript against its bibliography.
//!
//! [`Analyzer::analyze`] runs citation detection, structure analysis, context
//! capture and bibliography parsing, then resolves unnumbered citations and
//! validates the result.
//!
//! With the `parallel` feature the independent analyses run on the rayon
//! thread pool. RID assignment always runs sequentially in document order.

use crate::assign::{
    AssignerConfig, RidAssigner, RidAssignment, SleepThrottle, Throttle, ValidationReport,
};
use crate::context::{CitationContext, CitationDensity, ContextCapturer, citation_density};
use crate::detect::{CitationDetector, DetectionResult};
use crate::references::{ParsingResult, ReferenceParser, ReferenceSummary};
use crate::structure::{DocumentStructure, StructureAnalyzer};
use crate::{Citation, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Aggregate counts of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_citations: usize,
    pub numbered_citations: usize,
    pub unnumbered_citations: usize,
    pub total_references: usize,
    pub successful_assignments: usize,
    /// Mean confidence of the assignments, 0.0 when there are none
    pub average_confidence: f64,
}

impl AnalysisStatistics {
    fn new(
        detection: &DetectionResult,
        references: &ParsingResult,
        assignments: &[RidAssignment],
    ) -> Self {
        let average_confidence = if assignments.is_empty() {
            0.0
        } else {
            assignments.iter().map(|a| a.confidence).sum::<f64>() / assignments.len() as f64
        };
        Self {
            total_citations: detection.total(),
            numbered_citations: detection.numbered_count,
            unnumbered_citations: detection.unnumbered_count,
            total_references: references.references.len(),
            successful_assignments: assignments.len(),
            average_confidence,
        }
    }
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detection: DetectionResult,
    pub structure: DocumentStructure,
    /// Context of every detected citation, in detection order
    pub contexts: Vec<CitationContext>,
    pub density: CitationDensity,
    pub references: ParsingResult,
    pub reference_summary: ReferenceSummary,
    pub assignments: Vec<RidAssignment>,
    pub validation: ValidationReport,
    pub statistics: AnalysisStatistics,
}

/// Runs the full analysis pipeline.
///
/// # Examples
///
/// ```
/// use biblink::{Analyzer, AssignerConfig, NoThrottle};
///
/// let analyzer = Analyzer::new()
///     .with_config(AssignerConfig {
///         primary_threshold: 0.6,
///         ..Default::default()
///     })
///     .with_throttle(NoThrottle);
///
/// let result = analyzer.analyze("Plain text with [1].", "[1] A (2000). T. P.").unwrap();
/// assert_eq!(result.statistics.numbered_citations, 1);
/// assert!(result.assignments.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AssignerConfig,
    throttle: Option<Arc<dyn Throttle>>,
}

impl Analyzer {
    /// Creates an analyzer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the assignment configuration.
    #[must_use]
    pub fn with_config(mut self, config: AssignerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the pause between citations, which otherwise sleeps for
    /// `rate_limit_delay`.
    #[must_use]
    pub fn with_throttle(mut self, throttle: impl Throttle + 'static) -> Self {
        self.throttle = Some(Arc::new(throttle));
        self
    }

    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    fn assigner(&self) -> RidAssigner {
        let throttle = self
            .throttle
            .clone()
            .unwrap_or_else(|| Arc::new(SleepThrottle::new(self.config.rate_limit_delay)));
        RidAssigner::new(self.config.clone()).with_shared_throttle(throttle)
    }

    /// Analyzes `manuscript` against `bibliography`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the configuration is invalid; see
    /// [`AssignerConfig::validate`].
    pub fn analyze(&self, manuscript: &str, bibliography: &str) -> Result<AnalysisResult> {
        self.config.validate()?;

        let detector = CitationDetector::new();
        let capturer = ContextCapturer::new().with_window_size(self.config.window_size);

        #[cfg(feature = "parallel")]
        let (detection, (structure, references)) = rayon::join(
            || detector.detect(manuscript),
            || {
                rayon::join(
                    || StructureAnalyzer::new().analyze(manuscript),
                    || ReferenceParser::new().parse(bibliography),
                )
            },
        );

        #[cfg(not(feature = "parallel"))]
        let (detection, structure, references) = (
            detector.detect(manuscript),
            StructureAnalyzer::new().analyze(manuscript),
            ReferenceParser::new().parse(bibliography),
        );

        let contexts = capture_contexts(&capturer, manuscript, &detection.citations);
        let density = citation_density(manuscript, &detection.citations);
        let reference_summary =
            ReferenceSummary::from_references(&references.references, &self.config.chapter_ranges);

        let assigner = self.assigner();
        let assignments = assigner.assign_all(
            manuscript,
            &detection.citations,
            &structure,
            &references.references,
        );
        let validation = assigner.validate(&assignments);
        let statistics = AnalysisStatistics::new(&detection, &references, &assignments);

        info!(
            citations = statistics.total_citations,
            references = statistics.total_references,
            assigned = statistics.successful_assignments,
            errors = validation.errors.len(),
            warnings = validation.warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            detection,
            structure,
            contexts,
            density,
            references,
            reference_summary,
            assignments,
            validation,
            statistics,
        })
    }
}

#[cfg(feature = "parallel")]
fn capture_contexts(
    capturer: &ContextCapturer,
    text: &str,
    citations: &[Citation],
) -> Vec<CitationContext> {
    use rayon::prelude::*;

    citations
        .par_iter()
        .map(|citation| capturer.capture(text, citation))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn capture_contexts(
    capturer: &ContextCapturer,
    text: &str,
    citations: &[Citation],
) -> Vec<CitationContext> {
    capturer.capture_all(text, citations)
}
