//! Title extraction and per-line heading rules.
//!
//! Numbered headings take their level from the count of dotted components, so
//! `2.1 Methods` is level 2. A single component must carry a trailing period
//! (`1. Overview`): `1 Overview` is read as prose, like `1974 was a year`.

use crate::regex::Regex;
use std::sync::LazyLock;

const UNTITLED: &str = "Untitled Document";

/// Headings recognized on their own as level-1 sections.
const SPECIAL_SECTIONS: &[&str] = &[
    "introduction",
    "conclusion",
    "foreword",
    "preface",
    "acknowledgments",
    "acknowledgements",
    "abstract",
    "summary",
    "appendix",
    "references",
    "bibliography",
];

static CHAPTER_TITLED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s+(\d+)\s*[:—–-]\s*(\S.*)$").unwrap());

static CHAPTER_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s+(\d+)$").unwrap());

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(\.?)\s+(\S.*)$").unwrap());

/// A line recognized as a section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Heading {
    pub(crate) title: String,
    pub(crate) level: usize,
    pub(crate) chapter_number: Option<u32>,
}

impl Heading {
    fn new(title: impl Into<String>, level: usize) -> Self {
        Self {
            title: title.into(),
            level,
            chapter_number: None,
        }
    }
}

fn has_brackets(line: &str) -> bool {
    line.contains(['[', ']', '(', ')'])
}

/// Picks the document title from the first non-empty lines.
pub(crate) fn extract_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(20)
        .filter(|line| {
            let lower = line.to_lowercase();
            !lower.contains("copyright") && !lower.contains("all rights reserved")
        })
        .find(|line| line.chars().count() < 200)
        .map(|line| {
            if line.chars().count() < 100 {
                line.strip_suffix('.').unwrap_or(line).to_string()
            } else {
                line.to_string()
            }
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Classifies `line` as a heading, first matching rule wins.
///
/// `next_line` is the following line, if any, used by the blank-line rule.
pub(crate) fn detect_heading(line: &str, next_line: Option<&str>) -> Option<Heading> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(caps) = CHAPTER_TITLED.captures(line) {
        return Some(Heading {
            chapter_number: caps[1].parse().ok(),
            ..Heading::new(caps[2].trim(), 1)
        });
    }

    if let Some(caps) = CHAPTER_BARE.captures(line) {
        return Some(Heading {
            chapter_number: caps[1].parse().ok(),
            ..Heading::new(format!("Chapter {}", &caps[1]), 1)
        });
    }

    if let Some(caps) = NUMBERED.captures(line) {
        let level = caps[1].split('.').count();
        if level > 1 || !caps[2].is_empty() {
            return Some(Heading::new(caps[3].trim(), level));
        }
    }

    if SPECIAL_SECTIONS.contains(&line.to_lowercase().as_str()) {
        return Some(Heading::new(line, 1));
    }

    if line.split_whitespace().count() >= 3
        && !has_brackets(line)
        && line.chars().any(char::is_alphabetic)
        && line == line.to_uppercase()
    {
        return Some(Heading::new(line, 2));
    }

    let followed_by_blank = next_line.is_some_and(|next| next.trim().is_empty());
    if followed_by_blank
        && line.chars().count() < 100
        && !line.ends_with('.')
        && !has_brackets(line)
        && line.chars().next().is_some_and(char::is_uppercase)
    {
        return Some(Heading::new(line, 2));
    }

    None
}
