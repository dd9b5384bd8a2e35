//! Footnote handling: segregating page-bottom footnote ranges from the body
//! flow, normalizing the footnote stream, and linking superscript markers in
//! body lines to their entries.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Footnote, Fragment, Line};

use super::constants::{
    FOOTNOTE_BLOCK_MAX_VY, FOOTNOTE_MAX_GAP, FOOTNOTE_MIN_TEXT_LEN, FOOTNOTE_NUMERIC_FONT_RATIO,
    FOOTNOTE_START_MAX_VY, FOOTNOTE_SYMBOL_FONT_RATIO, FOOTNOTE_TEXT_FONT_RATIO, FOOTNOTE_WRAP_FONT_DELTA,
    FOOTNOTE_WRAP_X_DRIFT, SUPERSCRIPT_FONT_RATIO, SUPERSCRIPT_MAX_WIDTH_FACTOR, SUPERSCRIPT_NEIGHBOR_DISTANCE_EM,
    UNMARKED_FOOTNOTE_FONT_RATIO, UNMARKED_FOOTNOTE_MAX_VY, UNMARKED_FOOTNOTE_MIN_LEAD_GAP,
    UNMARKED_FOOTNOTE_MIN_LOWERCASE_WORDS, UNMARKED_FOOTNOTE_MIN_WORDS,
};
use super::profile::DocumentProfile;
use super::text::{alpha_len, is_affiliation_symbol, is_word_like, lowercase_word_count, word_count};

/// Sentinel pair wrapped around a linked superscript marker inside body
/// text; the HTML renderer expands it after escaping.
pub(crate) const FNREF_OPEN: char = '\u{E000}';
pub(crate) const FNREF_CLOSE: char = '\u{E001}';

static NUMERIC_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(?(\d{1,2})\)?[.)]?$").unwrap());
static NUMERIC_MARKER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(?(\d{1,2})\)?[.)]?\s+(\S.*)$").unwrap());
static URL_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());
static URL_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// One normalized footnote before rendering.
#[derive(Debug, Clone)]
pub(crate) struct FootnoteEntry {
    pub page_index: usize,
    pub number: Option<u32>,
    pub text: String,
    x: f32,
    font_size: f32,
}

impl FootnoteEntry {
    pub fn into_footnote(self) -> Footnote {
        Footnote {
            number: self.number,
            text: self.text,
        }
    }
}

/// Partition the line stream into body lines and a normalized footnote
/// stream, preserving within-page and page order.
pub(crate) fn segregate_footnotes(lines: Vec<Line>, profile: &DocumentProfile) -> (Vec<Line>, Vec<FootnoteEntry>) {
    let mut consumed: BTreeSet<usize> = BTreeSet::new();

    for i in 0..lines.len() {
        if consumed.contains(&i) {
            continue;
        }
        let start_len = match range_start(&lines, i, profile) {
            Some(len) => len,
            None => continue,
        };
        consumed.extend(i..i + start_len);
        let mut last = i + start_len - 1;
        while let Some(next) = extend_range(&lines, last, profile) {
            consumed.insert(next);
            last = next;
        }
    }

    let mut body = Vec::new();
    let mut footnote_lines: Vec<&Line> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if consumed.contains(&i) {
            footnote_lines.push(line);
        }
    }
    let entries = normalize_entries(&footnote_lines, profile);

    for (i, line) in lines.into_iter().enumerate() {
        if !consumed.contains(&i) {
            body.push(line);
        }
    }

    tracing::debug!(
        body = body.len(),
        footnotes = entries.len(),
        "footnote segregation done"
    );
    (body, entries)
}

/// Does a footnote range start at `i`? Returns the number of lines the
/// start consumes (1 for an inline or unmarked start, 2 when a standalone
/// marker line captures the following text line).
fn range_start(lines: &[Line], i: usize, profile: &DocumentProfile) -> Option<usize> {
    let line = &lines[i];
    let body = profile.body_font_size;
    let rel = profile.relative_y(line);

    if rel <= FOOTNOTE_START_MAX_VY {
        // Standalone marker line followed by footnote text.
        if is_standalone_marker(line, body) {
            let next = lines.get(i + 1)?;
            if next.page_index == line.page_index
                && is_footnote_text(next, profile)
                && profile.relative_y(next) <= FOOTNOTE_BLOCK_MAX_VY
            {
                return Some(2);
            }
            return None;
        }
        // Marker fused with its text on one line.
        if has_marker_prefix(line, body) && is_footnote_text(line, profile) {
            return Some(1);
        }
    }

    // Unmarked range: small prose sitting very low, separated from the text
    // above by a clear gap.
    if rel <= UNMARKED_FOOTNOTE_MAX_VY
        && line.font_size <= body * UNMARKED_FOOTNOTE_FONT_RATIO
        && word_count(&line.text) >= UNMARKED_FOOTNOTE_MIN_WORDS
        && lowercase_word_count(&line.text) >= UNMARKED_FOOTNOTE_MIN_LOWERCASE_WORDS
        && i > 0
    {
        let prev = &lines[i - 1];
        if prev.page_index == line.page_index
            && prev.y - line.y >= UNMARKED_FOOTNOTE_MIN_LEAD_GAP
            && prev.font_size > profile.body_font_size * UNMARKED_FOOTNOTE_FONT_RATIO
        {
            return Some(1);
        }
    }
    None
}

/// Extend a range past line `last` while y strictly descends in small steps
/// at footnote-sized fonts.
fn extend_range(lines: &[Line], last: usize, profile: &DocumentProfile) -> Option<usize> {
    let cur = &lines[last];
    let next = lines.get(last + 1)?;
    let descends = next.page_index == cur.page_index && next.y < cur.y && cur.y - next.y <= FOOTNOTE_MAX_GAP;
    let footnote_font = next.font_size <= profile.body_font_size * FOOTNOTE_TEXT_FONT_RATIO;
    (descends && footnote_font).then_some(last + 1)
}

/// A line consisting only of a footnote marker.
fn is_standalone_marker(line: &Line, body_font: f32) -> bool {
    let text = line.text.trim();
    if text.chars().count() == 1 && text.chars().next().is_some_and(is_affiliation_symbol) {
        return line.font_size <= body_font * FOOTNOTE_SYMBOL_FONT_RATIO;
    }
    NUMERIC_MARKER_RE.is_match(text) && line.font_size <= body_font * FOOTNOTE_NUMERIC_FONT_RATIO
}

/// A line starting with a marker followed by footnote text. Numeric markers
/// must be superscript-sized (checked on the marker fragment), except for
/// the common URL-footnote shape where the marker shares the text font.
fn has_marker_prefix(line: &Line, body_font: f32) -> bool {
    if line.text.chars().next().is_some_and(is_affiliation_symbol) {
        let marker_font = line
            .fragments
            .first()
            .filter(|f| f.text.trim().chars().count() == 1)
            .map(|f| f.font_size)
            .unwrap_or(line.font_size);
        return marker_font <= body_font * FOOTNOTE_SYMBOL_FONT_RATIO;
    }
    let Some(caps) = NUMERIC_MARKER_PREFIX_RE.captures(&line.text) else {
        return false;
    };
    let marker_font = line
        .fragments
        .first()
        .filter(|f| NUMERIC_MARKER_RE.is_match(f.text.trim()))
        .map(|f| f.font_size)
        .unwrap_or(line.font_size);
    marker_font <= body_font * FOOTNOTE_NUMERIC_FONT_RATIO
        || URL_START_RE.is_match(caps.get(2).map(|m| m.as_str()).unwrap_or(""))
}

/// Minimum substance for the text part of a footnote.
fn is_footnote_text(line: &Line, profile: &DocumentProfile) -> bool {
    let text = NUMERIC_MARKER_PREFIX_RE
        .captures(&line.text)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| line.text.clone());
    text.chars().count() >= FOOTNOTE_MIN_TEXT_LEN
        && alpha_len(&text) > 0
        && line.font_size <= profile.body_font_size * FOOTNOTE_TEXT_FONT_RATIO
}

/// Collapse the raw footnote lines into entries: standalone markers merge
/// with their text line, wrapped continuations merge into the previous
/// entry, and missing numeric markers on URL-only entries are inferred.
fn normalize_entries(footnote_lines: &[&Line], profile: &DocumentProfile) -> Vec<FootnoteEntry> {
    let mut entries: Vec<FootnoteEntry> = Vec::new();
    let mut pending_marker: Option<(String, &Line)> = None;

    for line in footnote_lines {
        if is_standalone_marker(line, profile.body_font_size) {
            pending_marker = Some((line.text.trim().to_string(), *line));
            continue;
        }

        let starts_new = pending_marker.is_some()
            || has_marker_prefix(line, profile.body_font_size)
            || URL_START_RE.is_match(&line.text)
            || entries.is_empty();

        let wraps_previous = !starts_new
            && entries.last().is_some_and(|prev| {
                prev.page_index == line.page_index
                    && (line.x - prev.x).abs() <= line.page_width * FOOTNOTE_WRAP_X_DRIFT
                    && (line.font_size - prev.font_size).abs() <= FOOTNOTE_WRAP_FONT_DELTA
            });

        if wraps_previous {
            let prev = entries.last_mut().unwrap();
            prev.text.push(' ');
            prev.text.push_str(&line.text);
            continue;
        }

        let (text, marker_line) = match pending_marker.take() {
            Some((marker, marker_line)) => (format!("{} {}", marker, line.text), marker_line),
            None => (line.text.clone(), *line),
        };
        let number = NUMERIC_MARKER_PREFIX_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        entries.push(FootnoteEntry {
            page_index: line.page_index,
            number,
            text,
            x: marker_line.x.min(line.x),
            font_size: line.font_size,
        });
    }

    infer_missing_markers(&mut entries);
    entries
}

/// Between a resolved marker N and a later marker M, a URL-only entry with
/// no marker takes N+1 (tracking forward through consecutive gaps).
fn infer_missing_markers(entries: &mut [FootnoteEntry]) {
    for i in 0..entries.len() {
        if entries[i].number.is_some() || !URL_ONLY_RE.is_match(&entries[i].text) {
            continue;
        }
        let prev = entries[..i].iter().rev().find_map(|e| e.number);
        let next = entries[i + 1..].iter().find_map(|e| e.number);
        if let (Some(n), Some(m)) = (prev, next) {
            if m > n + 1 {
                tracing::trace!(inferred = n + 1, "footnote marker inferred for URL-only entry");
                entries[i].number = Some(n + 1);
            }
        }
    }
}

// ───────────────────────────── marker linking ─────────────────────────────

/// Rewrite superscript numeric fragments in body lines into sentinel-tagged
/// footnote references for every number that leads a footnote entry.
pub(crate) fn link_footnote_markers(lines: &mut [Line], footnotes: &[FootnoteEntry]) {
    let numbers: BTreeSet<u32> = footnotes
        .iter()
        .filter_map(|f| f.number)
        .filter(|n| (1..=9).contains(n))
        .collect();
    if numbers.is_empty() {
        return;
    }

    for line in lines.iter_mut() {
        let mut rewrites: Vec<(u32, usize)> = Vec::new();
        for (fi, frag) in line.fragments.iter().enumerate() {
            let token = frag.text.trim();
            let Ok(n) = token.parse::<u32>() else { continue };
            if !numbers.contains(&n) || token.chars().count() != 1 {
                continue;
            }
            if !is_superscript_marker(line, fi) {
                continue;
            }
            let prior = line.fragments[..fi].iter().filter(|f| f.text.trim() == token).count();
            rewrites.push((n, prior));
        }
        for (n, prior) in rewrites {
            rewrite_marker_token(line, n, prior);
        }
    }
}

/// Superscript test for one fragment relative to its line: small against
/// the median non-marker font, narrow, and flanked by nearby word-like
/// neighbors rather than math context.
fn is_superscript_marker(line: &Line, fi: usize) -> bool {
    let frag = &line.fragments[fi];

    let mut fonts: Vec<f32> = line
        .fragments
        .iter()
        .filter(|f| f.text.trim().parse::<u32>().is_err())
        .map(|f| f.font_size)
        .collect();
    if fonts.is_empty() {
        return false;
    }
    fonts.sort_by(f32::total_cmp);
    let median = fonts[fonts.len() / 2];

    if frag.font_size > median * SUPERSCRIPT_FONT_RATIO {
        return false;
    }
    if frag.estimated_width() > frag.font_size * SUPERSCRIPT_MAX_WIDTH_FACTOR {
        return false;
    }

    let reach = frag.font_size * SUPERSCRIPT_NEIGHBOR_DISTANCE_EM;
    let word_neighbor = |neighbor: &Fragment, gap: f32| -> bool {
        gap <= reach && neighbor.text.split_whitespace().all(is_word_like)
    };
    if fi > 0 {
        let prev = &line.fragments[fi - 1];
        let gap = frag.x - (prev.x + prev.estimated_width());
        if !word_neighbor(prev, gap) {
            return false;
        }
    }
    if let Some(next) = line.fragments.get(fi + 1) {
        let gap = next.x - (frag.x + frag.estimated_width());
        if !word_neighbor(next, gap) {
            return false;
        }
    }
    fi > 0 || line.fragments.len() > 1
}

/// Replace the (prior+1)-th standalone occurrence of the token in the
/// line's text with the sentinel-wrapped marker.
fn rewrite_marker_token(line: &mut Line, n: u32, prior: usize) {
    let token = n.to_string();
    let mut seen = 0usize;
    let words: Vec<&str> = line.text.split(' ').collect();
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    let mut done = false;
    for w in words {
        if !done && w == token {
            if seen == prior {
                out.push(format!("{FNREF_OPEN}{n}{FNREF_CLOSE}"));
                done = true;
                continue;
            }
            seen += 1;
        }
        out.push(w.to_string());
    }
    if done {
        line.text = out.join(" ");
    }
}
