//! Page-artifact suppression: running headers/footers, page numbers, stamps,
//! affiliation markers, detached math, and the rest of the non-content lines.
//!
//! Two passes over the assembled lines:
//! 1. affix stripping, which mutates line text (long running labels and
//!    arXiv stamps glued onto content lines, special-token artifacts);
//! 2. full-line removal, an ordered short-circuit list of named rules, some
//!    backed by corpus evidence (repeated edge texts, page-number
//!    sequences) and some intrinsic to the line.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Line, LineId};

use super::constants::{
    AFFILIATION_INDEX_FONT_RATIO, AUTHOR_LABEL_PAGE_COVERAGE, FIGURE_LABEL_FONT_RATIO, MAX_AFFIX_STRIP_ITERATIONS,
    MIN_AFFIX_LABEL_LEN, MIN_DENSE_FIGURE_LABELS, MIN_PAGE_NUMBER_SEQUENCE_COVERAGE, MIN_PAGE_NUMBER_SEQUENCE_PAGES,
    MIN_REPEATED_EDGE_TEXT_PAGES, MIN_REPEATED_EDGE_TEXT_PAGE_COVERAGE, PARAGRAPH_X_DRIFT,
    RUNNING_LABEL_EDGE_OCCURRENCE_RATIO, RUNNING_LABEL_PATTERN_EDGE_COVERAGE,
};
use super::profile::DocumentProfile;
use super::text::{
    alpha_len, is_affiliation_symbol, math_char_ratio, normalize_spacing, substantive_len, uppercase_ratio, word_count,
};

/// Result of the artifact pass: surviving lines plus the detached math
/// fragments handed to the (optional) formula-reconstruction collaborator.
pub(crate) struct ArtifactOutcome {
    pub lines: Vec<Line>,
    pub detached_math: Vec<Line>,
}

/// Run both artifact passes.
pub(crate) fn filter_artifacts(mut lines: Vec<Line>, profile: &DocumentProfile) -> ArtifactOutcome {
    let stats = collect_edge_stats(&lines, profile);
    let labels = running_labels(&stats, profile);
    let parity_labels = alternating_parity_labels(&stats, profile);
    let page_number_ids = page_number_sequence_ids(&lines, profile);

    // Pass 1: affix stripping.
    let special_token_ids = strip_special_tokens(&mut lines);
    strip_label_affixes(&mut lines, &labels);
    strip_arxiv_affixes(&mut lines);

    // Pass 2: removal.
    let dense_label_ids = dense_figure_label_ids(&lines, profile);
    let (detached_ids, preserved_ids) = detached_math_ids(&lines, profile);

    let ctx = RemovalContext {
        profile,
        labels: &labels,
        parity_labels: &parity_labels,
        page_number_ids: &page_number_ids,
        special_token_ids: &special_token_ids,
        dense_label_ids: &dense_label_ids,
        detached_ids: &detached_ids,
        preserved_ids: &preserved_ids,
    };

    let mut kept = Vec::with_capacity(lines.len());
    let mut detached_math = Vec::new();
    let mut removed = 0usize;
    for line in lines {
        match removal_rule(&line, &ctx) {
            Some(rule) => {
                tracing::trace!(rule, page = line.page_index, text = %line.text, "artifact removed");
                removed += 1;
                if rule == "detached-math" {
                    detached_math.push(line);
                }
            }
            None => kept.push(line),
        }
    }

    tracing::debug!(
        removed,
        kept = kept.len(),
        running_labels = labels.len(),
        "artifact filter done"
    );
    ArtifactOutcome {
        lines: kept,
        detached_math,
    }
}

// ───────────────────────────── corpus evidence ─────────────────────────────

#[derive(Debug, Default)]
struct EdgeTextStats {
    pages: BTreeSet<usize>,
    occurrences: usize,
    edge_occurrences: usize,
    broad_edge_pages: BTreeSet<usize>,
    top_band_occurrences: usize,
    min_edge_font: f32,
    min_x: f32,
    max_x: f32,
}

fn collect_edge_stats(lines: &[Line], profile: &DocumentProfile) -> BTreeMap<String, EdgeTextStats> {
    let mut stats: BTreeMap<String, EdgeTextStats> = BTreeMap::new();
    for line in lines {
        if line.text.len() < 2 {
            continue;
        }
        let entry = stats.entry(line.text.clone()).or_insert_with(|| EdgeTextStats {
            min_edge_font: f32::MAX,
            min_x: f32::MAX,
            max_x: f32::MIN,
            ..EdgeTextStats::default()
        });
        entry.pages.insert(line.page_index);
        entry.occurrences += 1;
        entry.min_x = entry.min_x.min(line.x);
        entry.max_x = entry.max_x.max(line.x);
        if profile.in_edge_band(line) {
            entry.edge_occurrences += 1;
        }
        if profile.in_broad_edge_band(line) {
            entry.broad_edge_pages.insert(line.page_index);
            entry.min_edge_font = entry.min_edge_font.min(line.font_size);
        }
        if profile.in_top_band(line) {
            entry.top_band_occurrences += 1;
        }
    }
    stats
}

/// Texts shaped like running headers: 6–40 chars, 1–4 words, alphabetic
/// with at least 90% uppercase.
fn matches_running_label_pattern(text: &str) -> bool {
    let len = text.chars().count();
    if !(6..=40).contains(&len) {
        return false;
    }
    let words = word_count(text);
    if !(1..=4).contains(&words) {
        return false;
    }
    if !text.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return false;
    }
    uppercase_ratio(text) >= 0.9
}

/// Decide which repeated edge texts are running labels. Returns each label
/// with the smallest font it was observed at near an edge (the affix gate).
fn running_labels(stats: &BTreeMap<String, EdgeTextStats>, profile: &DocumentProfile) -> BTreeMap<String, f32> {
    let mut labels = BTreeMap::new();
    if profile.page_count == 0 {
        return labels;
    }
    let page_count = profile.page_count as f32;

    for (text, s) in stats {
        let coverage = s.pages.len() as f32 / page_count;
        let author_label = text.to_lowercase().contains("et al");

        let standard = s.pages.len() >= MIN_REPEATED_EDGE_TEXT_PAGES
            && coverage >= MIN_REPEATED_EDGE_TEXT_PAGE_COVERAGE
            && (s.edge_occurrences as f32 / s.occurrences as f32 >= RUNNING_LABEL_EDGE_OCCURRENCE_RATIO
                || (matches_running_label_pattern(text)
                    && s.broad_edge_pages.len() as f32 >= RUNNING_LABEL_PATTERN_EDGE_COVERAGE * s.pages.len() as f32));

        let loose_author = author_label
            && s.pages.len() >= MIN_REPEATED_EDGE_TEXT_PAGES
            && coverage >= AUTHOR_LABEL_PAGE_COVERAGE;

        if standard || loose_author {
            let gate_font = if s.min_edge_font < f32::MAX {
                s.min_edge_font
            } else {
                profile.body_font_size
            };
            labels.insert(text.clone(), gate_font);
        }
    }
    labels
}

/// Headers that appear only on odd (or only on even) pages: same text on a
/// single parity with ≥30% page coverage, always in the top band, at a
/// stable x.
fn alternating_parity_labels(stats: &BTreeMap<String, EdgeTextStats>, profile: &DocumentProfile) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    if profile.page_count < 4 {
        return labels;
    }
    for (text, s) in stats {
        if s.pages.len() < 2 {
            continue;
        }
        let parities: BTreeSet<usize> = s.pages.iter().map(|p| p % 2).collect();
        if parities.len() != 1 {
            continue;
        }
        if (s.pages.len() as f32) < 0.3 * profile.page_count as f32 {
            continue;
        }
        if s.top_band_occurrences != s.occurrences {
            continue;
        }
        if s.max_x - s.min_x > 5.0 {
            continue;
        }
        labels.insert(text.clone());
    }
    labels
}

/// Find lines participating in a running page-number sequence: bare numbers
/// in the edge band whose `value − pageIndex` offset is shared across
/// enough pages.
fn page_number_sequence_ids(lines: &[Line], profile: &DocumentProfile) -> BTreeSet<LineId> {
    static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}$").unwrap());

    let mut by_offset: BTreeMap<i64, Vec<(LineId, usize)>> = BTreeMap::new();
    for line in lines {
        if !NUMBER_RE.is_match(&line.text) || !profile.in_edge_band(line) {
            continue;
        }
        let Ok(value) = line.text.parse::<i64>() else { continue };
        let offset = value - line.page_index as i64;
        by_offset.entry(offset).or_default().push((line.id, line.page_index));
    }

    let mut ids = BTreeSet::new();
    for (offset, entries) in by_offset {
        let pages: BTreeSet<usize> = entries.iter().map(|(_, p)| *p).collect();
        if pages.len() >= MIN_PAGE_NUMBER_SEQUENCE_PAGES
            && pages.len() as f32 >= MIN_PAGE_NUMBER_SEQUENCE_COVERAGE * profile.page_count as f32
        {
            tracing::trace!(offset, pages = pages.len(), "page-number sequence detected");
            ids.extend(entries.iter().map(|(id, _)| *id));
        }
    }
    ids
}

// ───────────────────────────── affix stripping ─────────────────────────────

/// Remove `<pad>`/`<eos>`/`<bos>`/`<unk>` artifacts from mixed lines;
/// return the ids of lines that contained nothing else.
fn strip_special_tokens(lines: &mut [Line]) -> BTreeSet<LineId> {
    const TOKENS: [&str; 4] = ["<pad>", "<eos>", "<bos>", "<unk>"];
    let mut only_tokens = BTreeSet::new();
    for line in lines.iter_mut() {
        if !TOKENS.iter().any(|t| line.text.contains(t)) {
            continue;
        }
        let mut stripped = line.text.clone();
        for t in TOKENS {
            stripped = stripped.replace(t, " ");
        }
        let stripped = normalize_spacing(&stripped);
        if substantive_len(&stripped) == 0 {
            only_tokens.insert(line.id);
        } else {
            tracing::trace!(page = line.page_index, "special tokens stripped from line");
            line.text = stripped;
        }
    }
    only_tokens
}

/// True when the character at a strip boundary permits the cut.
fn boundary_ok(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || c.is_ascii_punctuation(),
    }
}

/// Strip long running labels off the front or back of content lines.
///
/// Longest labels first so nested labels cannot leave residue; bounded at
/// three rounds per line. The font gate only trims lines no larger than the
/// label's smallest edge-band occurrence, which leaves body and title text
/// untouched even when it happens to contain the label words.
fn strip_label_affixes(lines: &mut [Line], labels: &BTreeMap<String, f32>) {
    let mut strippable: Vec<(&String, f32)> = labels
        .iter()
        .filter(|(text, _)| text.chars().count() > MIN_AFFIX_LABEL_LEN)
        .map(|(text, font)| (text, *font))
        .collect();
    if strippable.is_empty() {
        return;
    }
    strippable.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    for line in lines.iter_mut() {
        for _ in 0..MAX_AFFIX_STRIP_ITERATIONS {
            let mut changed = false;
            for (label, gate_font) in &strippable {
                if line.font_size > gate_font + 0.5 || line.text.len() <= label.len() {
                    continue;
                }
                if line.text.starts_with(label.as_str()) && boundary_ok(line.text[label.len()..].chars().next()) {
                    line.text = normalize_spacing(&line.text[label.len()..]);
                    changed = true;
                } else if line.text.ends_with(label.as_str()) {
                    let cut = line.text.len() - label.len();
                    if boundary_ok(line.text[..cut].chars().next_back()) {
                        line.text = normalize_spacing(&line.text[..cut]);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
}

static ARXIV_STAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"arXiv:\d{4}\.\d{4,5}(?:v\d+)?\s+\[?[a-zA-Z][a-zA-Z.\-]*\]?\s+\d{1,2}\s+[A-Z][a-z]{2,8}\.?\s+\d{4}")
        .unwrap()
});

/// Strip an arXiv submission stamp glued to the front or back of a line.
fn strip_arxiv_affixes(lines: &mut [Line]) {
    for line in lines.iter_mut() {
        let Some(m) = ARXIV_STAMP_RE.find(&line.text) else { continue };
        if m.start() == 0 && m.end() == line.text.len() {
            continue; // whole-line stamps are handled by the removal pass
        }
        if m.start() == 0 || m.end() == line.text.len() {
            let mut remainder = String::with_capacity(line.text.len() - m.len());
            remainder.push_str(&line.text[..m.start()]);
            remainder.push_str(&line.text[m.end()..]);
            line.text = normalize_spacing(&remainder);
        }
    }
}

// ─────────────────────────── context-scoped rules ───────────────────────────

/// Dense inline figure labels: small right-half annotations that only count
/// as noise when a page is covered in them.
fn dense_figure_label_ids(lines: &[Line], profile: &DocumentProfile) -> BTreeSet<LineId> {
    let mut by_page: BTreeMap<usize, Vec<&Line>> = BTreeMap::new();
    for line in lines {
        by_page.entry(line.page_index).or_default().push(line);
    }

    let mut ids = BTreeSet::new();
    for (_, page_lines) in by_page {
        let candidates: Vec<&&Line> = page_lines
            .iter()
            .filter(|l| {
                l.x >= l.page_width * 0.5
                    && l.font_size <= profile.body_font_size * FIGURE_LABEL_FONT_RATIO
                    && page_lines.iter().any(|other| {
                        other.x < other.page_width * 0.4
                            && (other.y - l.y).abs() <= 40.0
                            && other.font_size >= profile.body_font_size * 0.9
                    })
            })
            .collect();
        if candidates.len() >= MIN_DENSE_FIGURE_LABELS {
            ids.extend(candidates.iter().map(|l| l.id));
        }
    }
    ids
}

/// True for lines that read like body prose.
fn is_prose_line(line: &Line, profile: &DocumentProfile) -> bool {
    word_count(&line.text) >= 4
        && alpha_len(&line.text) * 2 > line.text.chars().count()
        && (line.font_size - profile.body_font_size).abs() <= 1.0
}

/// Find detached math fragments: tiny symbol-heavy lines sandwiched between
/// prose lines sharing the same column x. Returns (removable, preserved):
/// a single-letter variable between a prose tail and an opening parenthesis
/// stays in the body flow.
fn detached_math_ids(lines: &[Line], profile: &DocumentProfile) -> (BTreeSet<LineId>, BTreeSet<LineId>) {
    let mut removable = BTreeSet::new();
    let mut preserved = BTreeSet::new();

    let mut by_page: BTreeMap<usize, Vec<&Line>> = BTreeMap::new();
    for line in lines {
        by_page.entry(line.page_index).or_default().push(line);
    }

    for (_, page_lines) in &by_page {
        for (i, line) in page_lines.iter().enumerate() {
            if line.text.is_empty() || word_count(&line.text) > 4 {
                continue;
            }
            let glyph_count = line.text.chars().filter(|c| !c.is_whitespace()).count();
            let single_letter = glyph_count == 1 && alpha_len(&line.text) == 1;
            let symbolic = alpha_len(&line.text) <= 3 && math_char_ratio(&line.text) >= 0.5;
            if !single_letter && !symbolic {
                continue;
            }

            let x_tolerance = line.page_width * PARAGRAPH_X_DRIFT;
            let mut above: Option<&Line> = None;
            for j in (i.saturating_sub(5)..i).rev() {
                let n = page_lines[j];
                if (n.x - line.x).abs() <= x_tolerance && is_prose_line(n, profile) {
                    above = Some(n);
                    break;
                }
            }
            let mut below: Option<&Line> = None;
            for j in i + 1..page_lines.len().min(i + 6) {
                let n = page_lines[j];
                if (n.x - line.x).abs() <= x_tolerance && is_prose_line(n, profile) {
                    below = Some(n);
                    break;
                }
            }
            let (Some(above), Some(below)) = (above, below) else { continue };

            if single_letter && !super::text::ends_sentence(&above.text) && below.text.starts_with('(') {
                preserved.insert(line.id);
            } else {
                removable.insert(line.id);
            }
        }
    }
    (removable, preserved)
}

// ───────────────────────────── removal driver ─────────────────────────────

struct RemovalContext<'a> {
    profile: &'a DocumentProfile,
    labels: &'a BTreeMap<String, f32>,
    parity_labels: &'a BTreeSet<String>,
    page_number_ids: &'a BTreeSet<LineId>,
    special_token_ids: &'a BTreeSet<LineId>,
    dense_label_ids: &'a BTreeSet<LineId>,
    detached_ids: &'a BTreeSet<LineId>,
    preserved_ids: &'a BTreeSet<LineId>,
}

/// The ordered removal rules. Evaluation short-circuits at the first
/// match; inserting a new rule means inserting a row at its priority.
static REMOVAL_RULES: &[(&str, fn(&Line, &RemovalContext<'_>) -> bool)] = &[
    ("empty-after-strip", |l, _| l.text.is_empty()),
    ("running-label", |l, c| {
        c.labels.contains_key(&l.text) || c.parity_labels.contains(&l.text)
    }),
    ("page-number", |l, c| c.page_number_ids.contains(&l.id)),
    ("special-token", |l, c| c.special_token_ids.contains(&l.id)),
    ("arxiv-stamp", |l, c| is_arxiv_stamp(l, c.profile)),
    ("page-counter-footer", |l, c| is_page_counter_footer(l, c.profile)),
    ("doi-line", |l, _| is_doi_only(l)),
    ("contact-email", |l, _| is_contact_email(l)),
    ("affiliation-index", |l, c| is_affiliation_index(l, c.profile)),
    ("affiliation-symbols", |l, _| is_symbolic_affiliation_cluster(l)),
    ("figure-label", |l, c| c.dense_label_ids.contains(&l.id)),
    ("venue-footer", |l, c| is_first_page_venue_footer(l, c.profile)),
    ("publisher-imprint", |l, c| is_publisher_imprint(l, c.profile)),
    ("symbol-artifact", |l, _| is_standalone_symbols(l)),
    ("detached-math", |l, c| c.detached_ids.contains(&l.id)),
    ("citation-marker", |l, _| is_standalone_citation_marker(l)),
];

/// Evaluate the rule list in priority order; the first matching rule names
/// the removal. `None` keeps the line.
fn removal_rule(line: &Line, ctx: &RemovalContext<'_>) -> Option<&'static str> {
    if ctx.preserved_ids.contains(&line.id) {
        return None;
    }
    REMOVAL_RULES
        .iter()
        .find(|(_, matches)| matches(line, ctx))
        .map(|(name, _)| *name)
}

// ───────────────────────────── intrinsic rules ─────────────────────────────

fn is_arxiv_stamp(line: &Line, profile: &DocumentProfile) -> bool {
    static FULL_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^arXiv:\d{4}\.\d{4,5}(?:v\d+)?\s+\[?[a-zA-Z][a-zA-Z.\-]*\]?\s+\d{1,2}\s+[A-Z][a-z]{2,8}\.?\s+\d{4}$",
        )
        .unwrap()
    });
    FULL_RE.is_match(&line.text)
        && line.estimated_width <= line.page_width * 0.7
        && (line.font_size >= profile.body_font_size + 6.0 || line.font_size >= profile.body_font_size * 1.6)
}

fn is_page_counter_footer(line: &Line, profile: &DocumentProfile) -> bool {
    static PAGE_OF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+ of \d+\b").unwrap());
    static DOMAIN_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b[A-Za-z0-9][A-Za-z0-9-]*\.[a-z]{2,6}\b").unwrap());
    profile.in_edge_band(line) && PAGE_OF_RE.is_match(&line.text) && DOMAIN_RE.is_match(&line.text)
}

fn is_doi_only(line: &Line) -> bool {
    static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:doi:\s*)?10\.\d{4,9}/\S+$").unwrap());
    line.page_index <= 1 && DOI_RE.is_match(&line.text)
}

fn is_contact_email(line: &Line) -> bool {
    static EMAIL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
    line.page_index == 0 && line.text.to_lowercase().starts_with("e-mail:") && EMAIL_RE.is_match(&line.text)
}

fn is_affiliation_index(line: &Line, profile: &DocumentProfile) -> bool {
    if line.page_index != 0 || alpha_len(&line.text) != 0 {
        return false;
    }
    let short_digit_tokens = line
        .text
        .split_whitespace()
        .filter(|t| t.chars().count() <= 2 && t.chars().all(|c| c.is_ascii_digit()))
        .count();
    short_digit_tokens >= 2
        && line.font_size <= profile.body_font_size * AFFILIATION_INDEX_FONT_RATIO
        && profile.relative_y(line) >= 0.6
}

fn is_symbolic_affiliation_cluster(line: &Line) -> bool {
    line.page_index == 0
        && line.text.chars().filter(|c| is_affiliation_symbol(*c)).count() >= 2
        && alpha_len(&line.text) <= 2
}

fn is_first_page_venue_footer(line: &Line, profile: &DocumentProfile) -> bool {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
    const VENUE_KEYWORDS: [&str; 8] = [
        "conference",
        "proceedings",
        "workshop",
        "symposium",
        "journal",
        "association",
        "annual meeting",
        "advances in",
    ];
    if line.page_index != 0 || profile.relative_y(line) > 0.08 {
        return false;
    }
    let lower = line.text.to_lowercase();
    YEAR_RE.is_match(&line.text) && VENUE_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn is_publisher_imprint(line: &Line, profile: &DocumentProfile) -> bool {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
    static LONG_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{5,}").unwrap());
    const CORPORATE_TOKENS: [&str; 12] = [
        "Elsevier",
        "Springer",
        "Wiley",
        "IEEE",
        "ACM",
        "Publishing",
        "Publishers",
        "Press",
        "Ltd",
        "Inc",
        "B.V.",
        "rights reserved",
    ];
    if profile.relative_y(line) > 0.15 {
        return false;
    }
    let corporate = CORPORATE_TOKENS.iter().filter(|t| line.text.contains(*t)).count();
    corporate >= 2 && YEAR_RE.is_match(&line.text) && LONG_NUMBER_RE.is_match(&line.text)
}

fn is_standalone_symbols(line: &Line) -> bool {
    let chars: Vec<char> = line.text.chars().filter(|c| !c.is_whitespace()).collect();
    (1..=3).contains(&chars.len())
        && chars.iter().all(|c| matches!(c, '!' | ')' | '+' | '\u{2032}'))
        && line.estimated_width <= line.font_size * 2.0
}

fn is_standalone_citation_marker(line: &Line) -> bool {
    static CITE_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d{1,3}\](?:\s+\[\d{1,3}\])*$").unwrap());
    CITE_ONLY_RE.is_match(&line.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests_support::line_at;

    /// A seven-page document skeleton with body prose on every page so the
    /// profile has sensible extents.
    fn skeleton(pages: usize) -> Vec<Line> {
        let mut lines = Vec::new();
        for p in 0..pages {
            for i in 0..10 {
                lines.push(line_at(
                    p,
                    72.0,
                    700.0 - i as f32 * 60.0,
                    10.0,
                    "ordinary body prose line with several words here",
                ));
            }
        }
        lines
    }

    fn renumber(lines: &mut [Line]) {
        for (i, line) in lines.iter_mut().enumerate() {
            line.id = i as u32;
        }
    }

    fn run(mut lines: Vec<Line>) -> Vec<String> {
        renumber(&mut lines);
        let profile = DocumentProfile::compute(&lines);
        filter_artifacts(lines, &profile)
            .lines
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_running_header_removed_on_enough_pages() {
        let mut lines = skeleton(7);
        for p in 0..5 {
            lines.push(line_at(p, 72.0, 770.0, 8.0, "JOURNAL OF TESTING"));
        }
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "JOURNAL OF TESTING"));
    }

    #[test]
    fn test_rare_header_survives() {
        let mut lines = skeleton(7);
        for p in 0..2 {
            lines.push(line_at(p, 72.0, 770.0, 8.0, "JOURNAL OF TESTING"));
        }
        let texts = run(lines);
        assert_eq!(texts.iter().filter(|t| *t == "JOURNAL OF TESTING").count(), 2);
    }

    #[test]
    fn test_author_et_al_label_loose_threshold() {
        let mut lines = skeleton(8);
        // Only 4 of 8 pages (50% coverage) — below the standard 60% gate but
        // above the 45% author gate.
        for p in [1, 3, 5, 7] {
            lines.push(line_at(p, 72.0, 770.0, 8.0, "Vaswani et al."));
        }
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "Vaswani et al."));
    }

    #[test]
    fn test_page_number_sequence_removed() {
        let mut lines = skeleton(6);
        for p in 0..6 {
            lines.push(line_at(p, 300.0, 40.0, 9.0, &(p + 1).to_string()));
        }
        let texts = run(lines);
        for p in 0..6 {
            assert!(!texts.iter().any(|t| *t == (p + 1).to_string()), "page number {} leaked", p + 1);
        }
    }

    #[test]
    fn test_isolated_number_survives() {
        let mut lines = skeleton(6);
        lines.push(line_at(2, 300.0, 40.0, 9.0, "7"));
        let texts = run(lines);
        assert!(texts.iter().any(|t| t == "7"));
    }

    #[test]
    fn test_arxiv_stamp_removed() {
        let mut lines = skeleton(4);
        lines.push(line_at(0, 20.0, 400.0, 17.0, "arXiv:1706.03762v5 [cs.CL] 6 Dec 2017"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains("arXiv:1706.03762")));
    }

    #[test]
    fn test_arxiv_mention_in_prose_survives() {
        let mut lines = skeleton(4);
        lines.push(line_at(1, 72.0, 400.0, 10.0, "as posted on arXiv in 2017 the model was"));
        let texts = run(lines);
        assert!(texts.iter().any(|t| t.contains("as posted on arXiv")));
    }

    #[test]
    fn test_doi_line_removed_on_early_pages_only() {
        let mut lines = skeleton(4);
        lines.push(line_at(0, 72.0, 40.0, 8.0, "doi: 10.1016/j.tcm.2020.08.008"));
        lines.push(line_at(3, 72.0, 400.0, 10.0, "10.1016/j.tcm.2020.08.008"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.starts_with("doi:")));
        assert!(texts.iter().any(|t| t == "10.1016/j.tcm.2020.08.008"));
    }

    #[test]
    fn test_contact_email_removed() {
        let mut lines = skeleton(3);
        lines.push(line_at(0, 72.0, 200.0, 9.0, "E-mail: corresponding@example.edu"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains("corresponding@example.edu")));
    }

    #[test]
    fn test_symbolic_affiliation_cluster_removed() {
        let mut lines = skeleton(3);
        lines.push(line_at(0, 72.0, 620.0, 8.0, "\u{2217} \u{2020} \u{2021}"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains('\u{2020}')));
    }

    #[test]
    fn test_standalone_citation_markers_removed() {
        let mut lines = skeleton(3);
        lines.push(line_at(1, 72.0, 400.0, 10.0, "[12] [13]"));
        lines.push(line_at(1, 72.0, 380.0, 10.0, "[7]"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "[12] [13]"));
        assert!(!texts.iter().any(|t| t == "[7]"));
    }

    #[test]
    fn test_special_token_only_line_removed_and_mixed_line_stripped() {
        let mut lines = skeleton(3);
        lines.push(line_at(1, 72.0, 402.0, 10.0, "<pad> <pad> <eos>"));
        lines.push(line_at(1, 72.0, 360.0, 10.0, "tokens <unk> appear in output"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains("<pad>")));
        assert!(texts.iter().any(|t| t == "tokens appear in output"));
    }

    #[test]
    fn test_affix_stripping_respects_font_gate() {
        let mut lines = skeleton(7);
        for p in 0..7 {
            lines.push(line_at(p, 72.0, 770.0, 8.0, "RUNNING HEADER TEXT"));
        }
        // Small-font line carrying the label as prefix: stripped.
        lines.push(line_at(2, 72.0, 768.0, 8.0, "RUNNING HEADER TEXT 42"));
        // Large-font line containing the same words: untouched.
        lines.push(line_at(0, 72.0, 500.0, 16.0, "RUNNING HEADER TEXT analysis methods"));
        let texts = run(lines);
        assert!(texts.iter().any(|t| t == "42"));
        assert!(texts.iter().any(|t| t == "RUNNING HEADER TEXT analysis methods"));
    }

    #[test]
    fn test_detached_math_removed_between_prose() {
        let mut lines = skeleton(3);
        lines.push(line_at(1, 72.0, 402.0, 10.0, "the loss follows the update rule below and"));
        lines.push(line_at(1, 74.0, 390.0, 9.0, "= + 1"));
        lines.push(line_at(1, 72.0, 378.0, 10.0, "which converges for any positive learning rate"));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "= + 1"));
    }

    #[test]
    fn test_single_letter_variable_preserved_before_parenthesis() {
        let mut lines = skeleton(3);
        lines.push(line_at(1, 72.0, 402.0, 10.0, "we denote the resulting sequence by the symbol"));
        lines.push(line_at(1, 74.0, 390.0, 9.0, "z"));
        lines.push(line_at(1, 72.0, 378.0, 10.0, "(which is defined over the full vocabulary) and"));
        let texts = run(lines);
        assert!(texts.iter().any(|t| t == "z"));
    }

    #[test]
    fn test_venue_footer_removed_from_first_page() {
        let mut lines = skeleton(3);
        lines.push(line_at(
            0,
            72.0,
            100.0,
            8.0,
            "31st Conference on Neural Information Processing Systems, 2017",
        ));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains("31st Conference")));
    }

    #[test]
    fn test_publisher_imprint_removed() {
        let mut lines = skeleton(3);
        lines.push(line_at(
            1,
            72.0,
            105.0,
            8.0,
            "Published by Elsevier Ltd 2020 order number 104523",
        ));
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t.contains("Elsevier")));
    }

    #[test]
    fn test_dense_figure_labels_require_twenty() {
        let mut lines = skeleton(2);
        // 21 tiny right-half labels, each with a nearby left body line.
        for i in 0..21 {
            lines.push(line_at(1, 400.0, 700.0 - i as f32 * 25.0, 6.0, "0.42"));
        }
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "0.42"));

        // Only a handful: kept.
        let mut few = skeleton(2);
        for i in 0..5 {
            few.push(line_at(1, 400.0, 700.0 - i as f32 * 25.0, 6.0, "0.42"));
        }
        let texts = run(few);
        assert!(texts.iter().any(|t| t == "0.42"));
    }

    #[test]
    fn test_alternating_parity_header_removed() {
        let mut lines = skeleton(8);
        for p in [1, 3, 5, 7] {
            lines.push(line_at(p, 200.0, 768.0, 9.0, "Proceedings of the Workshop"));
        }
        let texts = run(lines);
        assert!(!texts.iter().any(|t| t == "Proceedings of the Workshop"));
    }
}
