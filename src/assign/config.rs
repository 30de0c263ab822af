use crate::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

const DEFAULT_PRIMARY_THRESHOLD: f64 = 0.55;
const DEFAULT_SECONDARY_THRESHOLD: f64 = 0.45;
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_WINDOW_SIZE: usize = 200;
const DEFAULT_CHAPTERS: u32 = 9;

/// An inclusive range of numeric RIDs reserved for one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidRange {
    pub start: u32,
    pub end: u32,
}

impl RidRange {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, rid: u32) -> bool {
        self.start <= rid && rid <= self.end
    }

    /// The RIDs of the range in ascending order.
    pub fn rids(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Table mapping chapter numbers to their RID ranges.
///
/// Defaults to chapter `N` owning `[100N, 100N + 99]` for `N` in `1..=9`.
///
/// # Examples
///
/// ```
/// use biblink::{ChapterRanges, RidRange};
///
/// let ranges = ChapterRanges::default().with_range(10, RidRange::new(1000, 1099));
/// assert_eq!(ranges.range_for(2), Some(RidRange::new(200, 299)));
/// assert_eq!(ranges.chapter_for_rid(1042), Some(10));
/// assert_eq!(ranges.chapter_for_rid(42), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRanges {
    ranges: BTreeMap<u32, RidRange>,
}

impl Default for ChapterRanges {
    fn default() -> Self {
        let ranges = (1..=DEFAULT_CHAPTERS)
            .map(|chapter| (chapter, RidRange::new(chapter * 100, chapter * 100 + 99)))
            .collect();
        Self { ranges }
    }
}

impl ChapterRanges {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ranges: BTreeMap::new(),
        }
    }

    /// Adds or replaces the range of `chapter`.
    #[must_use]
    pub fn with_range(mut self, chapter: u32, range: RidRange) -> Self {
        self.ranges.insert(chapter, range);
        self
    }

    pub fn range_for(&self, chapter: u32) -> Option<RidRange> {
        self.ranges.get(&chapter).copied()
    }

    /// The chapter whose range contains `rid`, lowest chapter first.
    pub fn chapter_for_rid(&self, rid: u32) -> Option<u32> {
        self.ranges
            .iter()
            .find(|(_, range)| range.contains(rid))
            .map(|(&chapter, _)| chapter)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, RidRange)> + '_ {
        self.ranges.iter().map(|(&chapter, &range)| (chapter, range))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Configuration for RID assignment.
///
/// # Examples
///
/// ```
/// use biblink::AssignerConfig;
/// use std::time::Duration;
///
/// let config = AssignerConfig {
///     primary_threshold: 0.7,
///     rate_limit_delay: Duration::ZERO,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignerConfig {
    /// Scores at or above this are reported as primary matches
    pub primary_threshold: f64,
    /// Scores below this produce no assignment
    pub secondary_threshold: f64,
    /// Pause between successive citations in batch runs
    pub rate_limit_delay: Duration,
    /// Characters of context captured on each side of a citation
    pub window_size: usize,
    pub chapter_ranges: ChapterRanges,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            primary_threshold: DEFAULT_PRIMARY_THRESHOLD,
            secondary_threshold: DEFAULT_SECONDARY_THRESHOLD,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            window_size: DEFAULT_WINDOW_SIZE,
            chapter_ranges: ChapterRanges::default(),
        }
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidFieldValue {
            field: field.to_string(),
            message: format!("{} is outside [0, 1]", value),
        })
    }
}

impl AssignerConfig {
    /// Checks thresholds and chapter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidFieldValue`] for a threshold outside
    /// `[0, 1]` and [`AnalysisError::InvalidConfig`] when the secondary
    /// threshold exceeds the primary one or a chapter range is empty.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("primary_threshold", self.primary_threshold)?;
        check_unit_interval("secondary_threshold", self.secondary_threshold)?;

        if self.secondary_threshold > self.primary_threshold {
            return Err(AnalysisError::InvalidConfig(format!(
                "secondary threshold {} exceeds primary threshold {}",
                self.secondary_threshold, self.primary_threshold
            )));
        }

        if self.chapter_ranges.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "no chapter ranges configured".to_string(),
            ));
        }

        if let Some((chapter, range)) = self.chapter_ranges.iter().find(|(_, r)| r.is_empty()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "chapter {} has an inverted RID range {}-{}",
                chapter, range.start, range.end
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_default_ranges() {
        let ranges = ChapterRanges::default();
        assert_eq!(ranges.iter().count(), 9);
        assert_eq!(ranges.range_for(1), Some(RidRange::new(100, 199)));
        assert_eq!(ranges.range_for(9), Some(RidRange::new(900, 999)));
        assert_eq!(ranges.range_for(10), None);
    }

    #[rstest]
    #[case(100, Some(1))]
    #[case(199, Some(1))]
    #[case(250, Some(2))]
    #[case(999, Some(9))]
    #[case(99, None)]
    #[case(1000, None)]
    fn test_chapter_for_rid(#[case] rid: u32, #[case] expected: Option<u32>) {
        assert_eq!(ChapterRanges::default().chapter_for_rid(rid), expected);
    }

    #[test]
    fn test_range_helpers() {
        let range = RidRange::new(5, 7);
        assert_eq!(range.rids().collect::<Vec<_>>(), vec![5, 6, 7]);
        assert!(range.contains(5) && range.contains(7));
        assert!(!range.contains(8));
        assert!(RidRange::new(3, 2).is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = AssignerConfig::default();
        assert_eq!(config.primary_threshold, 0.55);
        assert_eq!(config.secondary_threshold, 0.45);
        assert_eq!(config.rate_limit_delay, Duration::from_millis(100));
        assert_eq!(config.window_size, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let config = AssignerConfig {
            primary_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidFieldValue { field, .. }) if field == "primary_threshold"
        ));

        let config = AssignerConfig {
            primary_threshold: 0.4,
            secondary_threshold: 0.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let config = AssignerConfig {
            chapter_ranges: ChapterRanges::empty(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));

        let config = AssignerConfig {
            chapter_ranges: ChapterRanges::default().with_range(3, RidRange::new(399, 300)),
            ..Default::default()
        };
        let error = config.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid configuration: chapter 3 has an inverted RID range 399-300"
        );
    }
}
