use crate::regex::Regex;
use std::sync::LazyLock;

static ENTRY_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\[\d+\]").unwrap());

/// The lines of one bibliography entry, starting at its `[rid]` marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawEntry<'a> {
    /// 1-indexed line of the marker
    pub(crate) line_number: usize,
    pub(crate) lines: Vec<&'a str>,
}

impl RawEntry<'_> {
    /// The entry's lines joined by newlines, as they appeared.
    pub(crate) fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Result of splitting a bibliography into entries.
#[derive(Debug, Default)]
pub(crate) struct Segmented<'a> {
    pub(crate) entries: Vec<RawEntry<'a>>,
    /// Non-blank lines outside any entry, with their line numbers
    pub(crate) ignored_lines: Vec<(usize, &'a str)>,
}

/// Splits bibliography text into entries.
///
/// An entry begins at a line with a leading `[digits]` marker and collects
/// following lines until the next marker line or a blank line.
pub(crate) fn split_entries(text: &str) -> Segmented<'_> {
    let mut segmented = Segmented::default();
    let mut current: Option<RawEntry> = None;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() {
            segmented.entries.extend(current.take());
            continue;
        }

        if ENTRY_MARKER.is_match(line) {
            segmented.entries.extend(current.take());
            current = Some(RawEntry {
                line_number,
                lines: vec![line.trim()],
            });
            continue;
        }

        match current.as_mut() {
            Some(entry) => entry.lines.push(line.trim()),
            None => segmented.ignored_lines.push((line_number, line.trim())),
        }
    }

    segmented.entries.extend(current);
    segmented
}
