//! Cross-page read-only statistics: the document profile.

use std::collections::BTreeMap;

use crate::types::Line;

use super::constants::{NEGATIVE_Y_LINE_RATIO, PAGE_BROAD_EDGE_MARGIN, PAGE_EDGE_MARGIN};

/// Per-page vertical extent across that page's lines.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageVerticalExtent {
    pub min_y: f32,
    pub max_y: f32,
}

/// Read-only document-wide statistics computed once after line assembly and
/// threaded through every later stage.
#[derive(Debug, Clone)]
pub(crate) struct DocumentProfile {
    /// Mode of the 0.5pt-quantized font sizes across all lines; the
    /// reference scale for all "small"/"large" font heuristics.
    pub body_font_size: f32,
    pub page_extents: BTreeMap<usize, PageVerticalExtent>,
    pub page_count: usize,
    /// True when the first page reports predominantly negative y values.
    pub negative_y_regime: bool,
}

impl DocumentProfile {
    pub fn compute(lines: &[Line]) -> Self {
        let body_font_size = most_frequent_font_size(lines.iter().map(|l| l.font_size));

        let mut page_extents: BTreeMap<usize, PageVerticalExtent> = BTreeMap::new();
        for line in lines {
            let extent = page_extents.entry(line.page_index).or_insert(PageVerticalExtent {
                min_y: line.y,
                max_y: line.y,
            });
            extent.min_y = extent.min_y.min(line.y);
            extent.max_y = extent.max_y.max(line.y);
        }

        let page_count = lines.iter().map(|l| l.page_index + 1).max().unwrap_or(0);

        let first_page_lines = lines.iter().filter(|l| l.page_index == 0).count();
        let first_page_negative = lines.iter().filter(|l| l.page_index == 0 && l.y < 0.0).count();
        let negative_y_regime =
            first_page_lines > 0 && first_page_negative as f32 / first_page_lines as f32 > NEGATIVE_Y_LINE_RATIO;

        let profile = Self {
            body_font_size,
            page_extents,
            page_count,
            negative_y_regime,
        };
        tracing::debug!(
            body_font_size = profile.body_font_size,
            page_count = profile.page_count,
            negative_y_regime = profile.negative_y_regime,
            "document profile computed"
        );
        profile
    }

    /// Relative vertical position of a line within its page's extent:
    /// 0.0 at the bottom line, 1.0 at the top line. Pages with no usable
    /// extent fall back to the raw page-height ratio.
    pub fn relative_y(&self, line: &Line) -> f32 {
        let span = self
            .page_extents
            .get(&line.page_index)
            .map(|e| (e.min_y, e.max_y - e.min_y))
            .filter(|(_, span)| *span > f32::EPSILON);
        match span {
            Some((min_y, span)) => ((line.y - min_y) / span).clamp(0.0, 1.0),
            None if line.page_height > 0.0 => (line.y / line.page_height).clamp(0.0, 1.0),
            None => 0.5,
        }
    }

    /// True when the line sits in the 8% edge band (top or bottom).
    pub fn in_edge_band(&self, line: &Line) -> bool {
        let rel = self.relative_y(line);
        rel <= PAGE_EDGE_MARGIN || rel >= 1.0 - PAGE_EDGE_MARGIN
    }

    /// True when the line sits in the broad 20% edge band.
    pub fn in_broad_edge_band(&self, line: &Line) -> bool {
        let rel = self.relative_y(line);
        rel <= PAGE_BROAD_EDGE_MARGIN || rel >= 1.0 - PAGE_BROAD_EDGE_MARGIN
    }

    /// True when the line sits in the top 20% of its page.
    pub fn in_top_band(&self, line: &Line) -> bool {
        self.relative_y(line) >= 1.0 - PAGE_BROAD_EDGE_MARGIN
    }
}

/// Compute the most frequent font size, quantized to 0.5pt.
pub(crate) fn most_frequent_font_size(sizes: impl Iterator<Item = f32>) -> f32 {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for fs in sizes {
        if !fs.is_finite() {
            continue;
        }
        *counts.entry((fs * 2.0).round() as i32).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(key, _)| key as f32 / 2.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests_support::line_at;

    #[test]
    fn test_body_font_is_mode() {
        let lines = vec![
            line_at(0, 10.0, 700.0, 12.0, "a"),
            line_at(0, 10.0, 680.0, 12.0, "b"),
            line_at(0, 10.0, 660.0, 12.0, "c"),
            line_at(0, 10.0, 640.0, 18.0, "big"),
        ];
        let profile = DocumentProfile::compute(&lines);
        assert_eq!(profile.body_font_size, 12.0);
    }

    #[test]
    fn test_relative_y_spans_extent() {
        let lines = vec![
            line_at(0, 10.0, 700.0, 12.0, "top"),
            line_at(0, 10.0, 400.0, 12.0, "mid"),
            line_at(0, 10.0, 100.0, 12.0, "bottom"),
        ];
        let profile = DocumentProfile::compute(&lines);
        assert!((profile.relative_y(&lines[0]) - 1.0).abs() < 1e-6);
        assert!((profile.relative_y(&lines[1]) - 0.5).abs() < 1e-6);
        assert!(profile.relative_y(&lines[2]).abs() < 1e-6);
    }

    #[test]
    fn test_edge_band_detection() {
        let mut lines = vec![line_at(0, 10.0, 792.0, 12.0, "header")];
        for i in 0..20 {
            lines.push(line_at(0, 10.0, 700.0 - i as f32 * 30.0, 12.0, "body"));
        }
        let profile = DocumentProfile::compute(&lines);
        assert!(profile.in_edge_band(&lines[0]));
        assert!(!profile.in_edge_band(&lines[10]));
    }

    #[test]
    fn test_negative_regime_from_first_page() {
        let lines = vec![
            line_at(0, 10.0, -10.0, 12.0, "a"),
            line_at(0, 10.0, -30.0, 12.0, "b"),
            line_at(0, 10.0, 700.0, 12.0, "c"),
        ];
        let profile = DocumentProfile::compute(&lines);
        assert!(profile.negative_y_regime);
    }

    #[test]
    fn test_empty_profile_is_degenerate_but_total() {
        let profile = DocumentProfile::compute(&[]);
        assert_eq!(profile.page_count, 0);
        assert_eq!(profile.body_font_size, 0.0);
    }
}
