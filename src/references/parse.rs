//! Decomposition of one bibliography entry into a [`Reference`].

use crate::Reference;
use crate::references::EntryError;
use crate::references::metadata::extract_metadata;
use crate::references::split::RawEntry;
use crate::regex::Regex;
use crate::utils::{normalize_whitespace, strip_wrapping_quotes};
use std::sync::LazyLock;

static RID_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\[(\d+)\]").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4}[a-z]?)\)").unwrap());

/// A period ending the title: followed by whitespace and a capital, or by the end.
static TITLE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(?:\s+[A-Z]|\s*$)").unwrap());

/// Splits the text after the year into title and publication.
fn split_title(remainder: &str) -> (String, String) {
    if let Some(end) = TITLE_END.find(remainder) {
        let title = &remainder[..end.start()];
        let publication = &remainder[end.start() + 1..];
        return (title.to_string(), publication.to_string());
    }

    let mut parts = remainder.split(". ");
    let title = parts.next().unwrap_or_default().to_string();
    let publication = parts.collect::<Vec<_>>().join(". ");
    (title, publication)
}

impl TryFrom<RawEntry<'_>> for Reference {
    type Error = EntryError;

    fn try_from(entry: RawEntry<'_>) -> Result<Self, Self::Error> {
        let raw_text = entry.text();
        let (text, metadata) = extract_metadata(&entry.lines);

        let marker = RID_MARKER.captures(&text).ok_or(EntryError::MissingRid)?;
        let rid = marker[1].trim().to_string();
        let body = normalize_whitespace(&text[marker.get(0).map_or(0, |m| m.end())..]);

        if body
            .chars()
            .all(|c| c.is_ascii_punctuation() || c.is_whitespace())
        {
            return Err(EntryError::EmptyEntry);
        }

        let (authors, year, title, publication) = match YEAR.captures(&body) {
            Some(caps) => {
                let (Some(whole), Some(year)) = (caps.get(0), caps.get(1)) else {
                    return Err(EntryError::MissingField("year".to_string()));
                };
                let before = &body[..whole.start()];
                let authors = before.strip_suffix('.').unwrap_or(before).trim();
                let remainder = body[whole.end()..]
                    .trim_start()
                    .trim_start_matches(['.', ','])
                    .trim();
                let (title, publication) = split_title(remainder);
                (authors.to_string(), year.as_str().to_string(), title, publication)
            }
            None => (String::new(), String::new(), body.clone(), String::new()),
        };

        let title = strip_wrapping_quotes(&normalize_whitespace(&title)).to_string();
        let authors = normalize_whitespace(&authors);
        if title.is_empty() && authors.is_empty() {
            return Err(EntryError::MissingField("title".to_string()));
        }

        Ok(Reference {
            rid,
            authors,
            year,
            title,
            publication: normalize_whitespace(&publication),
            raw_text,
            metadata,
        })
    }
}
