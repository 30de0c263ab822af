//! The standard citation recognizers.

use crate::CitationKind;
use crate::detect::{LineDetector, LineMatch};
use crate::regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Ranges spanning more ids than this are treated as malformed.
pub(crate) const MAX_RANGE_SPAN: u32 = 1000;

/// Characters allowed to follow a parenthetical number.
const PAREN_TAIL: &str = r"(?:[\s.,;:!?]|$)";

const SURNAME: &str = r"[A-Z][A-Za-z'’\-]+";

const SYMBOLS: &str = "*†‡§¶#";

/// Maps a Unicode superscript digit to its ASCII digit.
fn superscript_digit(c: char) -> Option<char> {
    match c {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        _ => None,
    }
}

/// Patterns for the four numeric sub-cases inside one kind of enclosure.
///
/// Group 1 of every pattern spans the enclosed marker itself.
struct EnclosedPatterns {
    single: Regex,
    empty: Regex,
    range: Regex,
    list: Regex,
}

impl EnclosedPatterns {
    fn build(open: &str, close: &str, bound: &str, tail: &str) -> Self {
        let compile = |inner: &str| {
            Regex::new(&format!(r"({open}{inner}{close}){tail}")).unwrap()
        };
        Self {
            single: compile(r"\s*(\d+)\s*"),
            empty: compile(r"\s*"),
            range: compile(&format!(r"\s*({bound})\s*[-–]\s*({bound})\s*")),
            list: compile(&format!(r"(\s*{bound}(?:\s*[,;]\s*{bound})+\s*)")),
        }
    }
}

static BRACKET_PATTERNS: LazyLock<EnclosedPatterns> =
    LazyLock::new(|| EnclosedPatterns::build(r"\[", r"\]", r"\d+", ""));

static PAREN_PATTERNS: LazyLock<EnclosedPatterns> =
    LazyLock::new(|| EnclosedPatterns::build(r"\(", r"\)", r"\d+", PAREN_TAIL));

static AUTHOR_YEAR_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    let compound = format!(r"{SURNAME}(?:\s+(?:&|and)\s+{SURNAME}|\s+et\s+al\.?)?");
    let inner = format!(r"({compound}),?\s+(\d{{4}}[a-z]?)");
    [
        Regex::new(&format!(r"\[{inner}\]")).unwrap(),
        Regex::new(&format!(r"\({inner}\)")).unwrap(),
    ]
});

static SYMBOL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(&format!(r"\[([{SYMBOLS}])\]")).unwrap(),
        Regex::new(&format!(r"\(([{SYMBOLS}])\)")).unwrap(),
    ]
});

static LETTER_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"\[([a-z])\]").unwrap(),
        Regex::new(r"\(([a-z])\)").unwrap(),
    ]
});

/// Span and text of the enclosed marker (group 1).
fn marker(caps: &Captures<'_>) -> Option<(usize, String)> {
    caps.get(1).map(|m| (m.start(), m.as_str().to_string()))
}

fn numbered(start: usize, original_text: &str, id: impl Into<String>) -> LineMatch {
    LineMatch {
        start,
        original_text: original_text.to_string(),
        id: id.into(),
        kind: CitationKind::Numbered,
    }
}

/// Expands `from-to` into one id per integer, or nothing if a bound is not numeric.
fn expand_range(from: &str, to: &str) -> Vec<String> {
    match (from.parse::<u32>(), to.parse::<u32>()) {
        (Ok(from), Ok(to)) if from <= to && to - from < MAX_RANGE_SPAN => {
            (from..=to).map(|n| n.to_string()).collect()
        }
        _ => {
            debug!(from, to, "skipping malformed citation range");
            Vec::new()
        }
    }
}

/// Splits a `,`/`;` separated list, keeping the entries that are integers.
fn expand_list(list: &str) -> Vec<String> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|item| {
            let valid = item.parse::<u32>().is_ok();
            if !valid {
                debug!(item, "skipping non-numeric citation list entry");
            }
            valid
        })
        .map(str::to_string)
        .collect()
}

/// Numbers, empty markers, ranges and lists in square brackets or parentheses.
pub(crate) struct EnclosedNumberDetector {
    name: &'static str,
    patterns: &'static LazyLock<EnclosedPatterns>,
}

impl EnclosedNumberDetector {
    /// `[12]`, `[]`, `[3-5]`, `[1, 2; 3]`
    pub(crate) fn bracketed() -> Self {
        Self {
            name: "bracketed",
            patterns: &BRACKET_PATTERNS,
        }
    }

    /// `(12)`, `()`, `(3-5)`, `(1, 2)` when followed by whitespace,
    /// punctuation or the end of the line.
    pub(crate) fn parenthetical() -> Self {
        Self {
            name: "parenthetical",
            patterns: &PAREN_PATTERNS,
        }
    }
}

impl LineDetector for EnclosedNumberDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect_line(&self, line: &str) -> Vec<LineMatch> {
        let patterns: &EnclosedPatterns = self.patterns;
        let mut matches = Vec::new();

        for caps in patterns.single.captures_iter(line) {
            let Some((start, text)) = marker(&caps) else {
                continue;
            };
            matches.push(numbered(start, &text, &caps[2]));
        }

        for caps in patterns.empty.captures_iter(line) {
            let Some((start, text)) = marker(&caps) else {
                continue;
            };
            matches.push(LineMatch {
                start,
                original_text: text,
                id: String::new(),
                kind: CitationKind::Unnumbered,
            });
        }

        for caps in patterns.range.captures_iter(line) {
            let Some((start, text)) = marker(&caps) else {
                continue;
            };
            for id in expand_range(&caps[2], &caps[3]) {
                matches.push(numbered(start, &text, id));
            }
        }

        for caps in patterns.list.captures_iter(line) {
            let Some((start, text)) = marker(&caps) else {
                continue;
            };
            for id in expand_list(&caps[2]) {
                matches.push(numbered(start, &text, id));
            }
        }

        matches
    }
}

/// Runs of Unicode superscript digits, e.g. `¹²`.
pub(crate) struct SuperscriptDetector;

impl LineDetector for SuperscriptDetector {
    fn name(&self) -> &'static str {
        "superscript"
    }

    fn detect_line(&self, line: &str) -> Vec<LineMatch> {
        let mut matches = Vec::new();
        let mut run: Option<(usize, String)> = None;

        for (index, c) in line.char_indices() {
            match superscript_digit(c) {
                Some(digit) => match run.as_mut() {
                    Some((_, id)) => id.push(digit),
                    None => run = Some((index, digit.to_string())),
                },
                None => {
                    if let Some((start, id)) = run.take() {
                        matches.push(numbered(start, &line[start..index], id));
                    }
                }
            }
        }
        if let Some((start, id)) = run {
            matches.push(numbered(start, &line[start..], id));
        }

        matches
    }
}

/// `[Surname 2001]` or `(Surname 2001)`, including `A & B`, `A and B` and
/// `A et al.` compounds. The id is `"Surname 2001"`.
pub(crate) struct AuthorYearDetector;

impl LineDetector for AuthorYearDetector {
    fn name(&self) -> &'static str {
        "author-year"
    }

    fn detect_line(&self, line: &str) -> Vec<LineMatch> {
        AUTHOR_YEAR_PATTERNS
            .iter()
            .flat_map(|pattern| pattern.captures_iter(line))
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let surname = crate::utils::normalize_whitespace(&caps[1]);
                Some(numbered(
                    whole.start(),
                    whole.as_str(),
                    format!("{} {}", surname, &caps[2]),
                ))
            })
            .collect()
    }
}

/// A single footnote-style symbol such as `[*]` or `(†)`.
pub(crate) struct SymbolDetector;

impl LineDetector for SymbolDetector {
    fn name(&self) -> &'static str {
        "symbol"
    }

    fn detect_line(&self, line: &str) -> Vec<LineMatch> {
        single_char_matches(&SYMBOL_PATTERNS, line)
    }
}

/// A single lowercase letter such as `[a]` or `(b)`.
pub(crate) struct LetterDetector;

impl LineDetector for LetterDetector {
    fn name(&self) -> &'static str {
        "letter"
    }

    fn detect_line(&self, line: &str) -> Vec<LineMatch> {
        single_char_matches(&LETTER_PATTERNS, line)
    }
}

fn single_char_matches(patterns: &[Regex; 2], line: &str) -> Vec<LineMatch> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.captures_iter(line))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(numbered(whole.start(), whole.as_str(), &caps[1]))
        })
        .collect()
}
