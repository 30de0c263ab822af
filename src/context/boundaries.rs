//! Sentence and paragraph boundaries.
//!
//! All offsets are byte offsets into the text. Terminators are ASCII, so every
//! boundary returned here is a char boundary.

/// Words that end in a period without ending the sentence, compared lowercase.
const ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "st", "jr", "sr", "vs", "cf", "fig", "vol", "no", "pp",
    "ed", "eds", "e.g", "i.e",
];

fn is_terminator(byte: u8) -> bool {
    matches!(byte, b'.' | b'!' | b'?')
}

/// Returns true if the terminator at `index` is part of an abbreviation.
fn is_abbreviation(text: &str, index: usize) -> bool {
    let bytes = text.as_bytes();

    // "A." initials
    if index >= 1 && bytes[index - 1].is_ascii_uppercase() {
        if index == 1 || bytes[index - 2].is_ascii_whitespace() {
            return true;
        }
    }

    if index >= 5 && text.get(index - 5..=index) == Some("et al.") {
        return true;
    }

    if bytes[index] != b'.' {
        return false;
    }
    let word_start = text[..index]
        .rfind(|c: char| c.is_whitespace())
        .map_or(0, |i| i + 1);
    let word = text[word_start..index]
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}

/// Returns true if the byte at `index` ends a sentence.
pub(crate) fn is_sentence_end(text: &str, index: usize) -> bool {
    let Some(&byte) = text.as_bytes().get(index) else {
        return false;
    };
    is_terminator(byte)
        && text[index + 1..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
        && !is_abbreviation(text, index)
}

/// Byte range of the sentence around `position`, terminator included.
pub(crate) fn sentence_bounds(text: &str, position: usize) -> (usize, usize) {
    let position = position.min(text.len());
    let start = (0..position)
        .rev()
        .find(|&i| is_sentence_end(text, i))
        .map_or(0, |i| i + 1);
    let end = (position..text.len())
        .find(|&i| is_sentence_end(text, i))
        .map_or(text.len(), |i| i + 1);
    (start, end)
}

/// Byte ranges of whitespace-only lines, trailing newline included.
fn blank_lines(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    text.split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, *offset, line))
        })
        .filter(|(_, _, line)| line.trim().is_empty())
        .map(|(start, end, _)| (start, end))
}

/// Byte range of the paragraph around `position`, delimited by blank lines.
///
/// A blank line may hold whitespace, so `\r\n\r\n` separates paragraphs
/// too. The line break ending the paragraph is excluded.
pub(crate) fn paragraph_bounds(text: &str, position: usize) -> (usize, usize) {
    let position = crate::utils::floor_char_boundary(text, position);
    let mut start = 0;
    let mut end = text.len();
    for (blank_start, blank_end) in blank_lines(text) {
        if blank_end <= position {
            start = blank_end;
        } else if blank_start >= position {
            let head = &text[..blank_start];
            let head = head.strip_suffix('\n').unwrap_or(head);
            let head = head.strip_suffix('\r').unwrap_or(head);
            end = head.len().max(position);
            break;
        }
    }
    (start, end)
}

/// Number of sentences in `text`, counting trailing unterminated text.
pub(crate) fn sentence_count(text: &str) -> usize {
    let mut count = 0;
    let mut last_end = 0;
    for index in 0..text.len() {
        if is_sentence_end(text, index) {
            count += 1;
            last_end = index + 1;
        }
    }
    if !text[last_end..].trim().is_empty() {
        count += 1;
    }
    count
}

/// Number of non-blank paragraphs in `text`.
pub(crate) fn paragraph_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if !blank && !in_paragraph {
            count += 1;
        }
        in_paragraph = !blank;
    }
    count
}
