//! Document structure discovery.
//!
//! Finds the document title and its headings (chapters, numbered sections,
//! special sections such as the preface, all-caps lines and short capitalized
//! lines followed by a blank line) and folds them into a section tree.
//!
//! # Example
//!
//! ```
//! use biblink::StructureAnalyzer;
//!
//! let text = "My Book\n\nChapter 1: Beginnings\nSome text.\n1.1 Early days\nMore text.\n";
//! let structure = StructureAnalyzer::new().analyze(text);
//!
//! assert_eq!(structure.title, "My Book");
//! let chapter = &structure.sections[1];
//! assert_eq!(chapter.title, "Beginnings");
//! assert_eq!(chapter.subsections[0].title, "Early days");
//! ```

mod heading;
mod tree;

use crate::regex::Regex;
use heading::{detect_heading, extract_title};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;
use tree::{LocatedHeading, fold_into_tree, with_boundaries};

static CHAPTER_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bchapter\s+(\d+)\b").unwrap());

/// A section of the document and the sections nested inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Nesting level, 1 for chapters and top-level sections
    pub level: usize,
    /// Byte offset of the heading line
    pub start_position: usize,
    /// Byte offset where the next heading (of any level) starts
    pub end_position: usize,
    /// 1-indexed line of the heading
    pub start_line: usize,
    pub end_line: usize,
    /// `N` when the heading was written as `Chapter N`
    pub chapter_number: Option<u32>,
    pub subsections: Vec<Section>,
}

impl Section {
    /// Returns true if `position` falls in `[start_position, end_position)`.
    pub fn contains(&self, position: usize) -> bool {
        self.start_position <= position && position < self.end_position
    }

    /// The chapter number from a `Chapter N` heading or title.
    pub fn chapter(&self) -> Option<u32> {
        self.chapter_number.or_else(|| {
            CHAPTER_IN_TITLE
                .captures(&self.title)
                .and_then(|caps| caps[1].parse().ok())
        })
    }
}

/// Title and section tree of a manuscript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub title: String,
    /// Top-level sections in document order
    pub sections: Vec<Section>,
    pub total_chars: usize,
    pub total_lines: usize,
}

impl DocumentStructure {
    /// The most deeply nested section containing `position`.
    pub fn find_section_at_position(&self, position: usize) -> Option<&Section> {
        self.section_path_at(position).last().copied()
    }

    /// The chain of sections from the top-level ancestor down to the most
    /// deeply nested section containing `position`. Empty if none contains it.
    pub fn section_path_at(&self, position: usize) -> Vec<&Section> {
        let mut path = Vec::new();
        if !find_path(&self.sections, position, &mut path) {
            path.clear();
        }
        path
    }

    /// The chapter number of the top-level section containing `position`.
    ///
    /// A top-level section without a chapter number, such as a `Summary`
    /// closing a chapter, belongs to the nearest chapter before it.
    pub fn chapter_at(&self, position: usize) -> Option<u32> {
        let top = self.section_path_at(position).first().copied()?;
        top.chapter().or_else(|| {
            self.flatten()
                .into_iter()
                .take_while(|section| section.start_position < top.start_position)
                .filter_map(Section::chapter)
                .last()
        })
    }

    /// All sections in document (pre-)order.
    pub fn flatten(&self) -> Vec<&Section> {
        fn walk<'a>(sections: &'a [Section], out: &mut Vec<&'a Section>) {
            for section in sections {
                out.push(section);
                walk(&section.subsections, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.sections, &mut out);
        out
    }
}

/// Depth-first search that prefers a containing descendant over its ancestor.
///
/// Children are searched even when the parent's own range does not contain
/// `position`, since a parent ends where its first child begins.
fn find_path<'a>(sections: &'a [Section], position: usize, path: &mut Vec<&'a Section>) -> bool {
    for section in sections {
        path.push(section);
        if find_path(&section.subsections, position, path) || section.contains(position) {
            return true;
        }
        path.pop();
    }
    false
}

/// Analyzer producing a [`DocumentStructure`] from manuscript text.
#[derive(Debug, Clone, Default)]
pub struct StructureAnalyzer;

impl StructureAnalyzer {
    /// Creates a new structure analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyzes `text` into a title and section tree.
    pub fn analyze(&self, text: &str) -> DocumentStructure {
        let lines: Vec<(usize, &str)> = text
            .split_inclusive('\n')
            .scan(0, |offset, raw| {
                let start = *offset;
                *offset += raw.len();
                Some((start, raw.trim_end_matches(['\n', '\r'])))
            })
            .collect();

        let headings: Vec<LocatedHeading> = lines
            .iter()
            .enumerate()
            .filter_map(|(index, &(start_position, line))| {
                let next_line = lines.get(index + 1).map(|&(_, next)| next);
                detect_heading(line, next_line).map(|heading| LocatedHeading {
                    heading,
                    start_position,
                    start_line: index + 1,
                })
            })
            .collect();

        let total_lines = text.lines().count();
        let flat = with_boundaries(headings, text.len(), total_lines);
        debug!(sections = flat.len(), "detected section headings");

        DocumentStructure {
            title: extract_title(text),
            sections: fold_into_tree(flat),
            total_chars: text.chars().count(),
            total_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const BOOK: &str = "\
Caught in the Act

Chapter 1: Origins
Early work framed the question.
1.1 First studies
Researchers ran experiments.

Chapter 2: Heuristics
Judgment relies on shortcuts.
2.1 Availability
2.1.1 Recall
Deeply nested text sits here [].
2.2 Anchoring
Anchors bias estimates.

Chapter 3
Later developments.
";

    fn position_of(needle: &str) -> usize {
        BOOK.find(needle).unwrap()
    }

    #[test]
    fn test_analyze_book_tree() {
        let structure = StructureAnalyzer::new().analyze(BOOK);

        assert_eq!(structure.title, "Caught in the Act");
        assert_eq!(structure.total_lines, BOOK.lines().count());
        assert_eq!(structure.total_chars, BOOK.chars().count());

        let top: Vec<_> = structure.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(top, vec!["Caught in the Act", "Origins", "Heuristics", "Chapter 3"]);

        let heuristics = &structure.sections[2];
        assert_eq!(heuristics.chapter_number, Some(2));
        let subsections: Vec<_> = heuristics
            .subsections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(subsections, vec!["Availability", "Anchoring"]);
        assert_eq!(heuristics.subsections[0].subsections[0].title, "Recall");
        assert_eq!(heuristics.subsections[0].subsections[0].level, 3);
    }

    #[test]
    fn test_flat_boundaries_chain() {
        let structure = StructureAnalyzer::new().analyze(BOOK);
        let flat = structure.flatten();

        for pair in flat.windows(2) {
            assert_eq!(pair[0].end_position, pair[1].start_position);
            assert_eq!(pair[0].end_line, pair[1].start_line);
        }
        let last = flat.last().unwrap();
        assert_eq!(last.end_position, BOOK.len());
        assert_eq!(last.end_line, structure.total_lines);
    }

    #[rstest]
    #[case("Deeply nested text", "Recall", Some(2))]
    #[case("Judgment relies", "Heuristics", Some(2))]
    #[case("Anchors bias", "Anchoring", Some(2))]
    #[case("Researchers ran", "First studies", Some(1))]
    #[case("Later developments", "Chapter 3", Some(3))]
    #[case("Caught in the Act", "Caught in the Act", None)]
    fn test_find_section_and_chapter(
        #[case] needle: &str,
        #[case] section: &str,
        #[case] chapter: Option<u32>,
    ) {
        let structure = StructureAnalyzer::new().analyze(BOOK);
        let position = position_of(needle);

        assert_eq!(
            structure.find_section_at_position(position).unwrap().title,
            section
        );
        assert_eq!(structure.chapter_at(position), chapter);
    }

    #[rstest]
    #[case("Closing thoughts", Some(2))]
    #[case("Appendix text", Some(3))]
    #[case("Before any chapter", None)]
    fn test_unnumbered_top_level_section_inherits_chapter(
        #[case] needle: &str,
        #[case] chapter: Option<u32>,
    ) {
        let text = "\
Preface
Before any chapter.

Chapter 2: Two
Body text.

Summary
Closing thoughts [].

Chapter 3: Three
Appendix
Appendix text.
";
        let structure = StructureAnalyzer::new().analyze(text);
        assert_eq!(structure.chapter_at(text.find(needle).unwrap()), chapter);
    }

    #[test]
    fn test_section_path() {
        let structure = StructureAnalyzer::new().analyze(BOOK);
        let path: Vec<_> = structure
            .section_path_at(position_of("Deeply nested"))
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(path, vec!["Heuristics", "Availability", "Recall"]);
    }

    #[test]
    fn test_position_outside_sections() {
        let text = "plain opening prose without headings\nChapter 1\nbody";
        let structure = StructureAnalyzer::new().analyze(text);
        assert_eq!(structure.find_section_at_position(0), None);
        assert!(structure.section_path_at(0).is_empty());
        assert_eq!(structure.chapter_at(0), None);
        assert_eq!(structure.chapter_at(text.len() - 1), Some(1));
    }

    #[test]
    fn test_chapter_from_title() {
        let section = Section {
            title: "Notes for chapter 7".to_string(),
            level: 1,
            start_position: 0,
            end_position: 1,
            start_line: 1,
            end_line: 1,
            chapter_number: None,
            subsections: Vec::new(),
        };
        assert_eq!(section.chapter(), Some(7));
        assert!(section.contains(0));
        assert!(!section.contains(1));
    }

    #[test]
    fn test_empty_document() {
        let structure = StructureAnalyzer::new().analyze("");
        assert_eq!(structure.title, "Untitled Document");
        assert!(structure.sections.is_empty());
        assert_eq!(structure.total_lines, 0);
    }
}
