use crate::{ChapterRanges, Reference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coverage statistics over a parsed bibliography.
///
/// # Examples
///
/// ```
/// use biblink::{ChapterRanges, ReferenceParser, ReferenceSummary};
///
/// let parsed = ReferenceParser::new().parse(
///     "[101] A (2001). One. P. FLAGS[FINALIZED] PRIMARY_URL[https://a.example]\n\
///      [205] B (2002). Two. P.",
/// );
/// let summary = ReferenceSummary::from_references(&parsed.references, &ChapterRanges::default());
///
/// assert_eq!(summary.total, 2);
/// assert_eq!(summary.finalized, 1);
/// assert_eq!(summary.missing_primary_url, vec!["205"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub total: usize,
    /// Reference counts keyed by the chapter owning each RID
    pub by_chapter: BTreeMap<u32, usize>,
    /// References whose RID lies in no chapter range
    pub outside_ranges: usize,
    pub with_primary_url: usize,
    pub with_secondary_url: usize,
    /// RIDs of references without a primary URL, in bibliography order
    pub missing_primary_url: Vec<String>,
    /// References flagged `FINALIZED`
    pub finalized: usize,
    pub flag_counts: BTreeMap<String, usize>,
}

impl ReferenceSummary {
    /// Summarizes `references`, attributing each to a chapter via `ranges`.
    pub fn from_references(references: &[Reference], ranges: &ChapterRanges) -> Self {
        let mut summary = Self {
            total: references.len(),
            ..Default::default()
        };

        for reference in references {
            match reference
                .rid_number()
                .and_then(|rid| ranges.chapter_for_rid(rid))
            {
                Some(chapter) => *summary.by_chapter.entry(chapter).or_default() += 1,
                None => summary.outside_ranges += 1,
            }

            let metadata = &reference.metadata;
            if metadata.url.is_some() {
                summary.with_primary_url += 1;
            } else {
                summary.missing_primary_url.push(reference.rid.clone());
            }
            if metadata.secondary_url.is_some() {
                summary.with_secondary_url += 1;
            }
            if metadata.is_finalized() {
                summary.finalized += 1;
            }
            for flag in &metadata.flags {
                *summary.flag_counts.entry(flag.clone()).or_default() += 1;
            }
        }

        summary
    }

    /// Percentage of references carrying a primary URL, 0.0 when empty.
    pub fn primary_url_coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.with_primary_url as f64 * 100.0 / self.total as f64
        }
    }

    /// Percentage of references carrying a secondary URL, 0.0 when empty.
    pub fn secondary_url_coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.with_secondary_url as f64 * 100.0 / self.total as f64
        }
    }
}
