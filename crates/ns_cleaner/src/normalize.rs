use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;

/// Paragraph openings of BBC promo, sign-up and credit lines.
const BOILERPLATE_PREFIXES: [&str; 9] = [
    "sign up for",
    "get our flagship newsletter",
    "follow bbc",
    "listen to",
    "watch:",
    "related topics",
    "copyright",
    "©",
    "bbc is not responsible",
];

lazy_static! {
    static ref GENERIC_HEADLINES: HashSet<&'static str> =
        ["news", "newsnews", "bbc news"].into_iter().collect();
}

/// Strips control and zero-width characters, maps non-breaking spaces to
/// plain spaces and collapses whitespace runs.
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{00a0}' | '\u{202f}' | '\u{2007}' => Some(' '),
            '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{2060}' | '\u{feff}' => None,
            c if c.is_whitespace() => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_boilerplate(paragraph: &str) -> bool {
    let lower = paragraph.to_lowercase();
    BOILERPLATE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Normalizes a newline-separated body into a single line, dropping
/// boilerplate paragraphs.
pub fn normalize_body(body: &str) -> String {
    body.lines()
        .map(normalize_text)
        .filter(|p| !p.is_empty() && !is_boilerplate(p))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_generic_headline(headline: &str) -> bool {
    GENERIC_HEADLINES.contains(headline.trim().to_lowercase().as_str())
}

/// Parses a publish date as found in article markup into UTC.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) and bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
