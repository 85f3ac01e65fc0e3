// src/timeline/parse.rs

use anyhow::{bail, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Wikipedia-style footnote markers: `[12]`, `[a]`, `[note 3]`.
static FOOTNOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("footnote regex should compile"));

/// Cell contents that stand for "no value".
const NULL_TOKENS: &[&str] = &["", "—", "–", "-", "?", "n/a", "na", "nan", "tbd"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%m/%d/%Y",
];

/// Strip footnotes, collapse whitespace, drop outer quotes.
pub fn clean_cell(raw: &str) -> String {
    let no_notes = FOOTNOTE_RE.replace_all(raw, "");
    let collapsed = no_notes.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// Parse a cumulative count cell. Placeholders yield `Ok(None)`.
pub fn parse_count(raw: &str) -> Result<Option<f64>> {
    let cleaned = clean_cell(raw);
    if is_null_token(&cleaned) {
        return Ok(None);
    }
    let digits: String = cleaned
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => bail!("not a count: {:?}", raw.trim()),
    }
}

/// Parse a date cell against the known layouts. Empty cells yield `Ok(None)`.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    let cleaned = clean_cell(raw);
    if is_null_token(&cleaned) {
        return Ok(None);
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Ok(Some(d));
        }
    }
    bail!("unrecognised date: {:?}", raw.trim())
}
