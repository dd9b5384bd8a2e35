//! Structural classification: assign each body line a role.
//!
//! Roles are decided in a fixed precedence order per line, with a few
//! pre-passes that need run-level evidence (code blocks, numbered lists,
//! the references region, wrapped-heading merges).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Line;

use super::constants::{
    HEADING_MAX_DIGIT_RATIO, HEADING_MAX_LEN, HEADING_MAX_TOP_LEVEL_NUMBER, HEADING_MAX_WORDS, HEADING_MIN_LEN,
    REFERENCES_MIN_DOC_FRACTION, REFERENCES_MIN_MARKERS, REFERENCES_WINDOW_LINES,
};
use super::paragraphs::{column_bounds, should_continue};
use super::profile::DocumentProfile;
use super::text::{digit_ratio, ends_sentence, is_math_symbol, word_count};

/// Role of one body line. A tag per line keeps the rule chain flat and lets
/// later stages remove or merge specific lines by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineRole {
    Heading(u8),
    /// An inline `Label: body` line; the label becomes a heading and the
    /// remainder a paragraph. `label_len` is the byte length of the label
    /// including the colon.
    LabeledHeading { level: u8, label_len: usize },
    ParagraphStart,
    ParagraphContinue,
    Bullet,
    NumberedItem,
    CodeLine,
    CaptionStart,
    CaptionContinue,
    ReferenceItem,
    TableRow,
    /// Absorbed into a neighboring line (wrapped heading continuation).
    Consumed,
}

#[derive(Debug)]
pub(crate) struct ClassifiedLine {
    pub line: Line,
    pub role: LineRole,
}

static TABLE_CAPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Table\s+\d+\s*[:.]").unwrap());
static FIGURE_CAPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:Figure|Fig\.)\s+\d+\s*[:.]").unwrap());
static REF_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d{1,3}\]\s*\S").unwrap());
static NUMBERED_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,4})((?:\.\d{1,3})*)[.\s]\s*([A-Za-z].*)$").unwrap());
static NUMBERED_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})[.)]\s+\S").unwrap());
static CODE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}\s+(\S.*)$").unwrap());
static CODE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:def|class|return|import|from|const|let|var|function)\b|[#=]").unwrap());
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:Street|Avenue|Ave\.|Road|Blvd)\b").unwrap());
static TRAILING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?%?$").unwrap());

/// Section names promoted to headings when they stand alone (or lead a
/// `Label: body` line).
const H2_SECTIONS: [&str; 22] = [
    "abstract",
    "introduction",
    "methods",
    "results",
    "discussion",
    "conclusion",
    "conclusions",
    "references",
    "acknowledgements",
    "acknowledgments",
    "appendix",
    "limitations",
    "ethics statement",
    "experimental section",
    "supporting information",
    "ethical approval",
    "funding",
    "credit authorship contribution statement",
    "declaration of competing interest",
    "data sharing statement",
    "research in context",
    "appendix a. supplementary data",
];

const H3_SECTIONS: [&str; 2] = ["device and film characterization", "material preparation and device fabrication"];

/// Classify every line. Input must already be artifact-filtered, ordered,
/// footnote-segregated, and title-stripped.
pub(crate) fn classify_lines(mut lines: Vec<Line>, profile: &DocumentProfile) -> Vec<ClassifiedLine> {
    let consumed = merge_wrapped_headings(&mut lines);
    let bounds = column_bounds(&lines);
    let code_ids = code_line_indices(&lines);
    let list_ids = numbered_list_indices(&lines);
    let refs = references_range(&lines);

    let mut roles: Vec<LineRole> = Vec::with_capacity(lines.len());
    for i in 0..lines.len() {
        let line = &lines[i];
        let role = if consumed.contains(&i) {
            LineRole::Consumed
        } else if code_ids.contains(&i) {
            LineRole::CodeLine
        } else if let Some(range) = &refs {
            if Some(i) == range.heading {
                LineRole::Heading(2)
            } else if i >= range.start && i < range.end {
                if REF_ITEM_RE.is_match(&line.text) {
                    LineRole::ReferenceItem
                } else {
                    LineRole::ParagraphContinue
                }
            } else {
                non_reference_role(&lines, &roles, i, &bounds, profile, &list_ids)
            }
        } else {
            non_reference_role(&lines, &roles, i, &bounds, profile, &list_ids)
        };
        roles.push(role);
    }

    mark_table_rows(&lines, &mut roles);

    let classified: Vec<ClassifiedLine> = lines
        .into_iter()
        .zip(roles)
        .map(|(line, role)| ClassifiedLine { line, role })
        .collect();
    tracing::debug!(
        headings = classified.iter().filter(|c| matches!(c.role, LineRole::Heading(_))).count(),
        references = classified.iter().filter(|c| c.role == LineRole::ReferenceItem).count(),
        "classification done"
    );
    classified
}

/// Role decision for lines outside the references region.
fn non_reference_role(
    lines: &[Line],
    roles: &[LineRole],
    i: usize,
    bounds: &std::collections::BTreeMap<(usize, u8), super::paragraphs::ColumnBounds>,
    profile: &DocumentProfile,
    list_ids: &BTreeSet<usize>,
) -> LineRole {
    let line = &lines[i];
    let text = line.text.as_str();

    if TABLE_CAPTION_RE.is_match(text) || FIGURE_CAPTION_RE.is_match(text) {
        return LineRole::CaptionStart;
    }
    if i > 0
        && matches!(roles[i - 1], LineRole::CaptionStart | LineRole::CaptionContinue)
        && caption_continues(&lines[i - 1], line)
    {
        return LineRole::CaptionContinue;
    }
    if text.starts_with('\u{2022}') {
        return LineRole::Bullet;
    }
    if list_ids.contains(&i) {
        return LineRole::NumberedItem;
    }
    if let Some(level) = named_section_level(text) {
        return LineRole::Heading(level);
    }
    if let Some((level, label_len)) = labeled_heading(text) {
        return LineRole::LabeledHeading { level, label_len };
    }
    if let Some(level) = numbered_heading_level(text) {
        return LineRole::Heading(level);
    }

    if i > 0 && matches!(roles[i - 1], LineRole::ParagraphStart | LineRole::ParagraphContinue) {
        let prev = &lines[i - 1];
        if should_continue(prev, line, bounds, profile) {
            return LineRole::ParagraphContinue;
        }
    }
    LineRole::ParagraphStart
}

/// Heading level from a numeric prefix (`1 `, `2.1 `, `3.2.1 `), with the
/// context filters that keep math, scores, years and addresses out.
pub(crate) fn numbered_heading_level(text: &str) -> Option<u8> {
    let caps = NUMBERED_HEADING_RE.captures(text)?;
    let top: u32 = caps.get(1)?.as_str().parse().ok()?;
    if top > HEADING_MAX_TOP_LEVEL_NUMBER {
        return None;
    }
    let depth = 1 + caps.get(2).map(|m| m.as_str().matches('.').count()).unwrap_or(0);
    if depth > 3 {
        return None;
    }

    let len = text.chars().count();
    if !(HEADING_MIN_LEN..=HEADING_MAX_LEN).contains(&len) {
        return None;
    }
    if word_count(text) > HEADING_MAX_WORDS {
        return None;
    }
    if digit_ratio(text) > HEADING_MAX_DIGIT_RATIO {
        return None;
    }

    let rest = caps.get(3)?.as_str();
    // Math-like remainders ("2 V − 1 s − 1") and table rows with trailing
    // scores are not headings.
    if rest.chars().any(is_math_symbol) {
        return None;
    }
    let single_letters = rest
        .split_whitespace()
        .filter(|t| t.chars().count() == 1 && t.chars().all(|c| c.is_alphabetic()))
        .count();
    if single_letters >= 2 {
        return None;
    }
    if TRAILING_NUMBER_RE.is_match(rest) {
        return None;
    }
    if ADDRESS_RE.is_match(rest) {
        return None;
    }

    Some(depth as u8 + 1)
}

/// Exact-match named section headings.
fn named_section_level(text: &str) -> Option<u8> {
    let lower = text.trim().trim_end_matches(':').trim().to_lowercase();
    if H2_SECTIONS.contains(&lower.as_str()) {
        Some(2)
    } else if H3_SECTIONS.contains(&lower.as_str()) {
        Some(3)
    } else {
        None
    }
}

/// `Label: body` lines whose label is a named section: split into a
/// heading plus paragraph downstream.
fn labeled_heading(text: &str) -> Option<(u8, usize)> {
    let colon = text.find(':')?;
    if colon + 1 >= text.len() {
        return None;
    }
    let label = &text[..colon];
    let level = named_section_level(label)?;
    Some((level, colon + 1))
}

/// Caption wrap: the caption keeps flowing while its last line is an open
/// sentence and the next line hangs directly below at the same font.
fn caption_continues(prev: &Line, cur: &Line) -> bool {
    prev.page_index == cur.page_index
        && prev.column == cur.column
        && !ends_sentence(&prev.text)
        && cur.y < prev.y
        && prev.y - cur.y <= 20.0
        && (cur.font_size - prev.font_size).abs() <= 0.8
        && (cur.x - prev.x).abs() <= cur.page_width * 0.08
}

/// Merge wrapped single-word continuations into their numbered heading.
/// Returns the set of absorbed line indices.
fn merge_wrapped_headings(lines: &mut [Line]) -> BTreeSet<usize> {
    let mut consumed = BTreeSet::new();
    for i in 0..lines.len().saturating_sub(1) {
        if consumed.contains(&i) || numbered_heading_level(&lines[i].text).is_none() {
            continue;
        }
        let (head, tail) = lines.split_at_mut(i + 1);
        let heading = &mut head[i];
        let next = &tail[0];
        let wraps = word_count(&next.text) == 1
            && next.page_index == heading.page_index
            && next.column == heading.column
            && heading.y - next.y <= heading.font_size * 2.0
            && heading.y > next.y
            && (next.font_size - heading.font_size).abs() <= 0.5;
        if wraps {
            let continuation = next.text.clone();
            heading.text.push(' ');
            heading.text.push_str(&continuation);
            consumed.insert(i + 1);
        }
    }
    consumed
}

/// Find runs of ≥2 numbered source lines whose content carries
/// code-context tokens.
fn code_line_indices(lines: &[Line]) -> BTreeSet<usize> {
    let mut ids = BTreeSet::new();
    let mut i = 0;
    while i < lines.len() {
        let mut j = i;
        let mut has_code_token = false;
        while j < lines.len() && lines[j].page_index == lines[i].page_index {
            let Some(caps) = CODE_LINE_RE.captures(&lines[j].text) else { break };
            if CODE_TOKEN_RE.is_match(caps.get(1).map(|m| m.as_str()).unwrap_or("")) {
                has_code_token = true;
            }
            j += 1;
        }
        if j - i >= 2 && has_code_token {
            ids.extend(i..j);
        }
        i = j.max(i + 1);
    }
    ids
}

/// Find runs of ≥2 consecutive `N.`/`N)` lines at the same x with
/// consecutive numbers: ordered-list items.
fn numbered_list_indices(lines: &[Line]) -> BTreeSet<usize> {
    let item_number = |line: &Line| -> Option<u32> {
        NUMBERED_ITEM_RE
            .captures(&line.text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };

    let mut ids = BTreeSet::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(first) = item_number(&lines[i]) else {
            i += 1;
            continue;
        };
        let mut j = i + 1;
        let mut expect = first + 1;
        while j < lines.len()
            && lines[j].page_index == lines[i].page_index
            && (lines[j].x - lines[i].x).abs() <= 2.0
            && item_number(&lines[j]) == Some(expect)
        {
            expect += 1;
            j += 1;
        }
        if j - i >= 2 {
            ids.extend(i..j);
        }
        i = j.max(i + 1);
    }
    ids
}

/// The references region: from an explicit "References" heading, or from a
/// cluster of `[N]` starts past 35% of the document.
struct ReferencesRange {
    heading: Option<usize>,
    start: usize,
    end: usize,
}

fn references_range(lines: &[Line]) -> Option<ReferencesRange> {
    let n = lines.len();
    let is_refs_heading = |text: &str| -> bool {
        let lower = text.trim().to_lowercase();
        lower == "references"
            || NUMBERED_HEADING_RE
                .captures(text)
                .and_then(|c| c.get(3))
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("references"))
    };

    let (heading, start) = if let Some(idx) = lines.iter().position(|l| is_refs_heading(&l.text)) {
        (Some(idx), idx + 1)
    } else {
        let earliest = (n as f32 * REFERENCES_MIN_DOC_FRACTION) as usize;
        let found = (earliest..n).find(|&i| {
            let window_end = (i + REFERENCES_WINDOW_LINES).min(n);
            lines[i..window_end]
                .iter()
                .filter(|l| REF_ITEM_RE.is_match(&l.text))
                .count()
                >= REFERENCES_MIN_MARKERS
                && REF_ITEM_RE.is_match(&lines[i].text)
        })?;
        (None, found)
    };

    let end = (start..n)
        .find(|&i| {
            named_section_level(&lines[i].text).is_some_and(|_| !is_refs_heading(&lines[i].text))
                || numbered_heading_level(&lines[i].text).is_some()
        })
        .unwrap_or(n);

    Some(ReferencesRange { heading, start, end })
}

/// After captions are known, mark the candidate rows of every table
/// caption so the table reconstructor can pick them up.
fn mark_table_rows(lines: &[Line], roles: &mut [LineRole]) {
    for i in 0..lines.len() {
        if roles[i] != LineRole::CaptionStart || !TABLE_CAPTION_RE.is_match(&lines[i].text) {
            continue;
        }
        // Rows begin after the caption's own wrapped lines.
        let mut anchor = i;
        while anchor + 1 < lines.len() && roles[anchor + 1] == LineRole::CaptionContinue {
            anchor += 1;
        }
        for row in super::tables::collect_table_rows(lines, anchor) {
            if matches!(roles[row], LineRole::ParagraphStart | LineRole::ParagraphContinue) {
                roles[row] = LineRole::TableRow;
            }
        }
    }
}

/// True when the caption line introduces a table (not a figure).
pub(crate) fn is_table_caption(text: &str) -> bool {
    TABLE_CAPTION_RE.is_match(text)
}
