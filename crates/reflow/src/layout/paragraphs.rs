//! Paragraph merging rules: continuation gates, soft-hyphen resolution,
//! URL wraps, same-row splits, and sentence-prefix dedup.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Column, Line};

use super::constants::{PARAGRAPH_FONT_DELTA, PARAGRAPH_FULL_WIDTH_SLACK, PARAGRAPH_X_DRIFT};
use super::profile::DocumentProfile;
use super::text::ends_sentence;

/// Horizontal extent of one page column (or of the page content for
/// uncolumned pages), used for "full width" decisions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnBounds {
    pub min_x: f32,
    pub max_right: f32,
}

impl ColumnBounds {
    pub fn width(&self) -> f32 {
        (self.max_right - self.min_x).max(1.0)
    }
}

fn column_key(line: &Line) -> (usize, u8) {
    let col = match line.column {
        None => 0,
        Some(Column::Left) => 1,
        Some(Column::Right) => 2,
    };
    (line.page_index, col)
}

/// Compute per-(page, column) horizontal bounds.
pub(crate) fn column_bounds(lines: &[Line]) -> BTreeMap<(usize, u8), ColumnBounds> {
    let mut bounds: BTreeMap<(usize, u8), ColumnBounds> = BTreeMap::new();
    for line in lines {
        let entry = bounds.entry(column_key(line)).or_insert(ColumnBounds {
            min_x: line.x,
            max_right: line.right(),
        });
        entry.min_x = entry.min_x.min(line.x);
        entry.max_right = entry.max_right.max(line.right());
    }
    bounds
}

/// Two adjacent lines landed on the same visual row (adjacent y-buckets)
/// and the second is the continuation of a sentence the first left open.
pub(crate) fn same_row_split(prev: &Line, cur: &Line) -> bool {
    prev.page_index == cur.page_index
        && (prev.y - cur.y).abs() <= 2.0
        && cur.x > prev.right() - prev.font_size
        && !ends_sentence(&prev.text)
        && cur.text.chars().next().is_some_and(|c| c.is_lowercase())
}

/// The §-continuation decision: does `cur` flow into the paragraph that
/// `prev` is part of?
pub(crate) fn should_continue(
    prev: &Line,
    cur: &Line,
    bounds: &BTreeMap<(usize, u8), ColumnBounds>,
    _profile: &DocumentProfile,
) -> bool {
    if prev.page_index != cur.page_index || prev.column != cur.column {
        return false;
    }
    if same_row_split(prev, cur) {
        return true;
    }

    let col = bounds.get(&column_key(prev)).copied().unwrap_or(ColumnBounds {
        min_x: prev.x,
        max_right: prev.right(),
    });
    let full_width = prev.right() >= col.max_right - col.width() * PARAGRAPH_FULL_WIDTH_SLACK;
    let hyphen_wrap = prev.text.ends_with('-');
    // A preserved inline math token is far narrower than its column; it
    // bridges the surrounding prose on both sides.
    let tiny_token = prev.estimated_width <= col.width() * 0.1 && !ends_sentence(&prev.text);

    let shape_ok = (!ends_sentence(&prev.text) && full_width) || hyphen_wrap || tiny_token;
    if !shape_ok {
        return false;
    }

    if !tiny_token && (cur.font_size - prev.font_size).abs() > PARAGRAPH_FONT_DELTA {
        return false;
    }
    let x_drift_ok =
        (cur.x - prev.x).abs() <= cur.page_width * PARAGRAPH_X_DRIFT || cur.estimated_width <= col.width() * 0.1;
    x_drift_ok
}

/// Suffixes that identify a line-break hyphen as a soft wrap; the hyphen is
/// removed when re-joining. Anything else keeps the hyphen (compound
/// reading), never a space.
const WRAP_SUFFIXES: [&str; 20] = [
    "tion", "sion", "ment", "ments", "ing", "ings", "ity", "ities", "ness", "ance", "ence", "ancy", "ency", "able",
    "ible", "ization", "isation", "ized", "ised", "ously",
];

static URL_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+$").unwrap());
static URL_CONTINUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9./_#?=&%~-]+(\s|$)").unwrap());

/// Append a continuation line's text to the paragraph buffer, resolving
/// soft hyphens and wrapped URLs.
pub(crate) fn append_continuation(buf: &mut String, next: &str) {
    let next = next.trim();
    if next.is_empty() {
        return;
    }
    if buf.is_empty() {
        buf.push_str(next);
        return;
    }

    // Wrapped URL: join without a space so the hyperlink survives intact.
    if URL_TAIL_RE.is_match(buf) && URL_CONTINUATION_RE.is_match(next) {
        buf.push_str(next);
        return;
    }

    if buf.ends_with('-') {
        let first_word: String = next.chars().take_while(|c| c.is_alphabetic()).collect();
        let soft_wrap = next.chars().next().is_some_and(|c| c.is_lowercase())
            && WRAP_SUFFIXES.iter().any(|s| first_word.ends_with(s));
        if soft_wrap {
            buf.pop();
        }
        // Either way the word halves re-join directly: a soft wrap loses
        // the hyphen, a compound (a-IGZO, data-driven) keeps it.
        buf.push_str(next);
        return;
    }

    buf.push(' ');
    buf.push_str(next);
}

/// Collapse an immediately repeated leading sentence:
/// "Implementation. Implementation. X" → "Implementation. X".
pub(crate) fn dedup_sentence_prefix(text: &str) -> String {
    let Some(dot) = text.find(". ") else {
        return text.to_string();
    };
    if dot > 60 {
        return text.to_string();
    }
    let prefix = &text[..dot + 2];
    let mut rest = &text[dot + 2..];
    let mut deduped = false;
    while rest.starts_with(prefix) {
        rest = &rest[prefix.len()..];
        deduped = true;
    }
    if deduped {
        format!("{prefix}{rest}")
    } else {
        text.to_string()
    }
}
