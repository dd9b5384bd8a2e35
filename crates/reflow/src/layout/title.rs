//! Title detection on the first page: scored large-font candidates with an
//! author-list fallback for papers whose title is not set in display type.

use std::collections::BTreeSet;

use crate::types::{Line, LineId};

use super::constants::{
    TITLE_FONT_DELTA, TITLE_FONT_DELTA_NEGATIVE_Y, TITLE_FONT_RATIO, TITLE_FONT_RATIO_NEGATIVE_Y,
};
use super::profile::DocumentProfile;
use super::text::{capitalized_token_count, ends_sentence, uppercase_ratio};

/// The detected title text and the lines it consumed.
#[derive(Debug, Clone)]
pub(crate) struct TitleDetection {
    pub text: String,
    pub consumed: BTreeSet<LineId>,
}

/// Detect the document title among the first page's lines.
pub(crate) fn detect_title(lines: &[Line], profile: &DocumentProfile) -> Option<TitleDetection> {
    let page0: Vec<&Line> = lines.iter().filter(|l| l.page_index == 0).collect();
    if page0.is_empty() {
        return None;
    }

    if let Some(found) = score_candidates(&page0, profile) {
        tracing::debug!(title = %found.text, "title detected via font scoring");
        return Some(found);
    }
    let found = author_block_fallback(&page0, profile);
    if let Some(found) = &found {
        tracing::debug!(title = %found.text, "title detected via author-block fallback");
    }
    found
}

/// Primary route: filter and score large centered candidates, then merge
/// wrapped continuation lines.
fn score_candidates(page0: &[&Line], profile: &DocumentProfile) -> Option<TitleDetection> {
    let body = profile.body_font_size;
    let (delta, ratio) = if profile.negative_y_regime {
        (TITLE_FONT_DELTA_NEGATIVE_Y, TITLE_FONT_RATIO_NEGATIVE_Y)
    } else {
        (TITLE_FONT_DELTA, TITLE_FONT_RATIO)
    };
    let threshold = (body + delta).max(body * ratio);

    let mut best: Option<(f32, usize)> = None;
    for (i, line) in page0.iter().enumerate() {
        if !is_candidate(line, page0, profile, threshold) {
            continue;
        }
        let center_offset = (line.center_x() - line.page_width / 2.0).abs();
        let center_score = 1.0 - (center_offset / (line.page_width * 0.2)).clamp(0.0, 1.0);
        let score = 3.0 * (line.font_size / body) + 2.0 * center_score + profile.relative_y(line);
        if best.map(|(s, _)| score > s).unwrap_or(true) {
            best = Some((score, i));
        }
    }

    let (_, idx) = best?;
    Some(merge_continuations(page0, idx))
}

fn is_candidate(line: &Line, page0: &[&Line], profile: &DocumentProfile, threshold: f32) -> bool {
    if line.font_size < threshold {
        return false;
    }
    if line.text.chars().count() < 8 {
        return false;
    }
    if matches!(line.text.chars().last(), Some('.' | '!' | '?')) {
        return false;
    }
    if profile.relative_y(line) < 0.45 {
        return false;
    }
    if line.estimated_width > line.page_width * 0.7 {
        return false;
    }
    let center_offset = (line.center_x() - line.page_width / 2.0).abs();
    if center_offset > line.page_width * 0.2 {
        return false;
    }
    // Dense same-font blocks are cover-page disclaimers, not titles.
    let block_size = page0
        .iter()
        .filter(|other| (other.y - line.y).abs() <= 90.0 && (other.font_size - line.font_size).abs() <= 0.5)
        .count();
    block_size <= 3
}

/// Merge wrapped title lines directly above/below the winner when they
/// share the font, stay centered, and a soft wrap is likely.
fn merge_continuations(page0: &[&Line], idx: usize) -> TitleDetection {
    let title = page0[idx];
    let mut parts: Vec<&str> = vec![&title.text];
    let mut consumed: BTreeSet<LineId> = BTreeSet::new();
    consumed.insert(title.id);

    let continues = |upper: &Line, lower: &Line| -> bool {
        (upper.font_size - lower.font_size).abs() <= 0.5
            && (lower.center_x() - lower.page_width / 2.0).abs() <= lower.page_width * 0.2
            && upper.estimated_width < upper.page_width * 0.9
            && (lower.text.chars().next().is_some_and(|c| c.is_lowercase()) || !ends_sentence(&upper.text))
    };

    if idx > 0 {
        let above = page0[idx - 1];
        if continues(above, title) && above.text.chars().count() >= 8 {
            parts.insert(0, &above.text);
            consumed.insert(above.id);
        }
    }
    if let Some(below) = page0.get(idx + 1) {
        if continues(title, below) {
            parts.push(&below.text);
            consumed.insert(below.id);
        }
    }

    TitleDetection {
        text: parts.join(" "),
        consumed,
    }
}

const METADATA_TOKENS: [&str; 6] = ["@", "university", "institute", "e-mail", "http", "abstract"];

/// Fallback route: locate the author list, then walk backward collecting
/// aligned title-looking lines; the uppermost one is the title.
fn author_block_fallback(page0: &[&Line], _profile: &DocumentProfile) -> Option<TitleDetection> {
    let author_idx = page0.iter().position(|l| looks_like_author_list(l))?;

    let anchor = page0[author_idx];
    let mut best: Option<&Line> = None;
    let start = author_idx.saturating_sub(8);
    for line in page0[start..author_idx].iter().rev() {
        if !looks_like_title_line(line) {
            continue;
        }
        if (line.x - anchor.x).abs() > line.page_width * 0.08 {
            continue;
        }
        best = Some(line);
    }

    best.map(|line| TitleDetection {
        text: line.text.clone(),
        consumed: BTreeSet::from([line.id]),
    })
}

fn looks_like_author_list(line: &Line) -> bool {
    let commas = line.text.matches(',').count();
    let lower = line.text.to_lowercase();
    commas >= 2 && capitalized_token_count(&line.text) >= 4 && !METADATA_TOKENS.iter().any(|t| lower.contains(t))
}

fn looks_like_title_line(line: &Line) -> bool {
    let len = line.text.chars().count();
    (20..=140).contains(&len) && line.text.matches(',').count() <= 1 && uppercase_ratio(&line.text) < 0.9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests_support::line_at;

    /// First page with body prose and a large centered title line.
    fn page_with_title() -> Vec<Line> {
        let mut lines = vec![line_at(0, 160.0, 730.0, 17.0, "Attention Is All You Need")];
        for i in 0..14 {
            lines.push(line_at(
                0,
                72.0,
                650.0 - i as f32 * 40.0,
                10.0,
                "ordinary body prose occupying the rest of the page",
            ));
        }
        for (i, line) in lines.iter_mut().enumerate() {
            line.id = i as u32;
        }
        lines
    }

    #[test]
    fn test_large_centered_line_wins() {
        let lines = page_with_title();
        let profile = DocumentProfile::compute(&lines);
        let title = detect_title(&lines, &profile).expect("title expected");
        assert_eq!(title.text, "Attention Is All You Need");
    }

    #[test]
    fn test_low_line_rejected() {
        let mut lines = page_with_title();
        // Move the big line to the bottom fifth of the page.
        lines[0].y = 120.0;
        let profile = DocumentProfile::compute(&lines);
        let title = detect_title(&lines, &profile);
        assert!(title.is_none() || title.unwrap().text != "Attention Is All You Need");
    }

    #[test]
    fn test_dense_same_font_block_rejected() {
        let mut lines = page_with_title();
        // Surround the candidate with three more same-font lines nearby —
        // the shape of a cover-page disclaimer block.
        let next_id = lines.len() as u32;
        for k in 0..3 {
            let mut extra = line_at(0, 160.0, 726.0 - k as f32 * 20.0, 17.0, "provisional large print notice");
            extra.id = next_id + k as u32;
            lines.push(extra);
        }
        let profile = DocumentProfile::compute(&lines);
        assert!(detect_title(&lines, &profile).is_none());
    }

    #[test]
    fn test_wrapped_title_merged() {
        let mut lines = vec![
            line_at(0, 150.0, 740.0, 17.0, "Deep Residual Learning for"),
            line_at(0, 190.0, 718.0, 17.0, "Image Recognition"),
        ];
        for i in 0..14 {
            lines.push(line_at(
                0,
                72.0,
                650.0 - i as f32 * 40.0,
                10.0,
                "ordinary body prose occupying the rest of the page",
            ));
        }
        for (i, line) in lines.iter_mut().enumerate() {
            line.id = i as u32;
        }
        let profile = DocumentProfile::compute(&lines);
        let title = detect_title(&lines, &profile).expect("title expected");
        assert_eq!(title.text, "Deep Residual Learning for Image Recognition");
        assert_eq!(title.consumed.len(), 2);
    }

    #[test]
    fn test_author_block_fallback() {
        // No display-type title: the title shares the body font.
        let mut lines = vec![
            line_at(0, 72.0, 740.0, 11.0, "Clinical outcomes of pulmonary embolism in hospitalized patients"),
            line_at(0, 72.0, 720.0, 10.0, "Jane Roe, John Smith, Alice Jones, Robert Brown"),
        ];
        for i in 0..14 {
            lines.push(line_at(
                0,
                72.0,
                650.0 - i as f32 * 40.0,
                10.0,
                "ordinary body prose occupying the rest of the page",
            ));
        }
        for (i, line) in lines.iter_mut().enumerate() {
            line.id = i as u32;
        }
        let profile = DocumentProfile::compute(&lines);
        let title = detect_title(&lines, &profile).expect("fallback title expected");
        assert!(title.text.starts_with("Clinical outcomes"));
    }

    #[test]
    fn test_empty_document_yields_none() {
        let profile = DocumentProfile::compute(&[]);
        assert!(detect_title(&[], &profile).is_none());
    }
}
