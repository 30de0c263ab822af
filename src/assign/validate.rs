//! Advisory checks over a finished set of assignments.

use crate::assign::RidAssignment;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One finding of the validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub assigned_rid: String,
    /// Byte offset of the citation the finding concerns
    pub position: usize,
    pub message: String,
}

/// Errors and warnings found in a set of assignments.
///
/// Validation never removes or changes assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// RID collisions between different citations
    pub errors: Vec<ValidationIssue>,
    /// Low confidence and chapter mismatches
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validates `assignments` against `secondary_threshold`.
pub(crate) fn validate_assignments(
    assignments: &[RidAssignment],
    secondary_threshold: f64,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let by_rid = assignments
        .iter()
        .into_group_map_by(|assignment| assignment.assigned_rid.as_str());
    for (rid, group) in by_rid.into_iter().sorted_by_key(|(rid, _)| *rid) {
        let positions: Vec<usize> = group
            .iter()
            .map(|assignment| assignment.citation.position)
            .unique()
            .collect();
        if positions.len() > 1 {
            report.errors.push(ValidationIssue {
                assigned_rid: rid.to_string(),
                position: positions[0],
                message: format!(
                    "RID {} assigned to {} different citations",
                    rid,
                    positions.len()
                ),
            });
        }
    }

    for assignment in assignments {
        let issue = |message: String| ValidationIssue {
            assigned_rid: assignment.assigned_rid.clone(),
            position: assignment.citation.position,
            message,
        };

        if assignment.confidence < secondary_threshold {
            report.warnings.push(issue(format!(
                "confidence {:.2} is below the secondary threshold {:.2}",
                assignment.confidence, secondary_threshold
            )));
        }

        if let Ok(rid) = assignment.assigned_rid.parse::<u32>() {
            let implied = rid / 100;
            if implied != assignment.chapter {
                report.warnings.push(issue(format!(
                    "RID {} implies chapter {} but the citation is in chapter {}",
                    rid, implied, assignment.chapter
                )));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Citation, CitationKind};
    use pretty_assertions::assert_eq;

    fn assignment(rid: &str, position: usize, confidence: f64, chapter: u32) -> RidAssignment {
        RidAssignment {
            citation: Citation {
                id: String::new(),
                position,
                line_number: 1,
                column_number: position + 1,
                original_text: "[]".to_string(),
                context_before: String::new(),
                context_after: String::new(),
                kind: CitationKind::Unnumbered,
            },
            assigned_rid: rid.to_string(),
            confidence,
            reason: String::new(),
            suggested_reference: 0,
            chapter,
        }
    }

    #[test]
    fn test_clean_assignments() {
        let report = validate_assignments(
            &[assignment("101", 0, 0.9, 1), assignment("205", 40, 0.5, 2)],
            0.45,
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_duplicate_rids_are_errors() {
        let report = validate_assignments(
            &[
                assignment("101", 0, 0.9, 1),
                assignment("101", 30, 0.9, 1),
                assignment("101", 30, 0.9, 1),
            ],
            0.45,
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].assigned_rid, "101");
        assert_eq!(report.errors[0].message, "RID 101 assigned to 2 different citations");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_warnings() {
        let report = validate_assignments(
            &[assignment("150", 0, 0.3, 1), assignment("305", 10, 0.8, 2), assignment("999", 20, 0.8, 9)],
            0.45,
        );
        assert!(report.errors.is_empty());
        let messages: Vec<_> = report.warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "confidence 0.30 is below the secondary threshold 0.45",
                "RID 305 implies chapter 3 but the citation is in chapter 2",
            ]
        );
    }
}
