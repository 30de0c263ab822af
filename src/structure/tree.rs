//! The two passes that turn detected headings into a section tree.
//!
//! 1. [`with_boundaries`] closes each flat section at the start of the next
//!    one (or at document end).
//! 2. [`fold_into_tree`] nests the flat list with a level stack.
//!
//! Both passes take their input by value and return new sections.

use crate::structure::Section;
use crate::structure::heading::Heading;

/// A heading together with where it starts.
#[derive(Debug, Clone)]
pub(crate) struct LocatedHeading {
    pub(crate) heading: Heading,
    pub(crate) start_position: usize,
    pub(crate) start_line: usize,
}

/// Builds flat sections whose ends are the next section's start.
pub(crate) fn with_boundaries(
    headings: Vec<LocatedHeading>,
    end_position: usize,
    end_line: usize,
) -> Vec<Section> {
    let next_starts: Vec<(usize, usize)> = headings
        .iter()
        .skip(1)
        .map(|h| (h.start_position, h.start_line))
        .chain(std::iter::once((end_position, end_line)))
        .collect();

    headings
        .into_iter()
        .zip(next_starts)
        .map(|(located, (end_position, end_line))| Section {
            title: located.heading.title,
            level: located.heading.level,
            start_position: located.start_position,
            end_position,
            start_line: located.start_line,
            end_line,
            chapter_number: located.heading.chapter_number,
            subsections: Vec::new(),
        })
        .collect()
}

/// Nests a position-ordered flat list of sections by level.
///
/// Entries whose level is at least the incoming section's level are closed
/// and attached to their parent; the incoming section becomes a child of
/// whatever remains on top of the stack, or a root.
pub(crate) fn fold_into_tree(flat: Vec<Section>) -> Vec<Section> {
    let mut roots = Vec::new();
    let mut stack: Vec<Section> = Vec::new();

    for section in flat {
        while stack.last().is_some_and(|top| top.level >= section.level) {
            if let Some(closed) = stack.pop() {
                attach(closed, &mut stack, &mut roots);
            }
        }
        stack.push(section);
    }

    while let Some(closed) = stack.pop() {
        attach(closed, &mut stack, &mut roots);
    }

    roots
}

fn attach(section: Section, stack: &mut [Section], roots: &mut Vec<Section>) {
    match stack.last_mut() {
        Some(parent) => parent.subsections.push(section),
        None => roots.push(section),
    }
}
