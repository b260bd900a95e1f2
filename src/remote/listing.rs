//! Text-token scanning of the archive index page.
//!
//! The index page is an ordinary HTML directory listing with no structured
//! API. The only contract it offers is a text node reading `Last modified:`
//! followed by a text node holding the publication date as `YYYY/MM/DD`.
//! This module splits the markup into text tokens and runs a two-state
//! scanner over them.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Label text that precedes the publication date on the index page.
pub const LAST_MODIFIED_LABEL: &str = "Last modified:";

/// Matches markup that never carries text: comments, script/style bodies, tags.
/// A `<` not followed by a tag name or `!/?` is text.
#[allow(clippy::expect_used)]
static MARKUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<[A-Za-z!/?][^>]*>")
        .expect("markup pattern is a valid regex")
});

/// Splits HTML markup into its non-blank text nodes, in document order.
///
/// Each token is trimmed and has the handful of entities found in directory
/// listings decoded.
#[must_use]
pub fn text_tokens(markup: &str) -> Vec<String> {
    MARKUP_PATTERN
        .split(markup)
        .map(|chunk| decode_entities(chunk.trim()))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Scanner position within the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for the `Last modified:` label.
    SeekingLabel,
    /// Label seen; the next token is the date value.
    CapturingValue,
}

/// Result of scanning the index page tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The label was found and the following token parsed as a date.
    Found(NaiveDate),
    /// The label never appeared.
    LabelMissing,
    /// The label appeared but was the last token on the page.
    ValueMissing,
    /// The token after the label is not a `YYYY/MM/DD` calendar date.
    MalformedValue(String),
}

impl ScanOutcome {
    /// Returns the publication date when one was found.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Found(date) => Some(*date),
            _ => None,
        }
    }
}

/// Scans text tokens for the publication date.
///
/// Only the first occurrence of the label is honored: the scan ends on the
/// token that follows it, whether or not that token parses.
#[must_use]
pub fn scan_last_modified<I, S>(tokens: I) -> ScanOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = ScanState::SeekingLabel;
    for token in tokens {
        let token = token.as_ref().trim();
        match state {
            ScanState::SeekingLabel => {
                if token == LAST_MODIFIED_LABEL {
                    state = ScanState::CapturingValue;
                }
            }
            ScanState::CapturingValue => {
                return match parse_listing_date(token) {
                    Some(date) => ScanOutcome::Found(date),
                    None => ScanOutcome::MalformedValue(token.to_string()),
                };
            }
        }
    }

    match state {
        ScanState::SeekingLabel => ScanOutcome::LabelMissing,
        ScanState::CapturingValue => ScanOutcome::ValueMissing,
    }
}

/// Parses the listing's `YYYY/MM/DD` date by rewriting it to ISO `YYYY-MM-DD`.
#[must_use]
pub fn parse_listing_date(raw: &str) -> Option<NaiveDate> {
    let iso = raw.trim().replace('/', "-");
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok()
}
