//! Column detection and reading-order sorting for multi-column pages.
//!
//! Detection looks for a persistent horizontal gap between fragment
//! x-centers across enough rows of a page. Assignment is conservative:
//! lines that straddle the split (full-width titles, captions, top matter)
//! keep no column and are ordered around the columns rather than inside
//! them, so column text never interleaves.

use std::collections::BTreeMap;

use crate::types::{Column, Line};

use super::constants::{
    COLUMN_LEFT_MAX_RIGHT, COLUMN_MIN_GAP, COLUMN_MIN_GAP_FRACTION, COLUMN_MIN_GAP_ROWS, COLUMN_MIN_GAP_ROW_RATIO,
    COLUMN_MIN_VERTICAL_SPAN, COLUMN_RIGHT_MIN_LEFT,
};

/// Slack when deciding a line fits wholly inside one column.
const COLUMN_EDGE_SLACK: f32 = 4.0;

/// Reorder all lines so that on two-column pages the left column reads
/// before the right column. Single-column pages keep assembly order.
pub(crate) fn sort_reading_order(lines: Vec<Line>) -> Vec<Line> {
    let mut by_page: BTreeMap<usize, Vec<Line>> = BTreeMap::new();
    for line in lines {
        by_page.entry(line.page_index).or_default().push(line);
    }

    let mut out = Vec::new();
    for (page_index, page_lines) in by_page {
        match detect_column_split(&page_lines) {
            Some(split_x) => {
                tracing::debug!(page = page_index, split_x, "two-column page detected");
                let mut page_lines = split_merged_rows(page_lines, split_x);
                assign_columns(&mut page_lines, split_x);
                out.extend(order_two_column_page(page_lines));
            }
            None => out.extend(page_lines),
        }
    }
    // Splitting created new lines; restore unique, sequential ids.
    for (i, line) in out.iter_mut().enumerate() {
        line.id = i as u32;
    }
    out
}

/// The assembler buckets by y across the whole page, so a two-column body
/// row arrives as one line holding fragments from both columns. Split such
/// rows at the column boundary; a line with a fragment physically crossing
/// the gutter (full-width title, spanning caption) is left intact to
/// straddle.
fn split_merged_rows(page_lines: Vec<Line>, split_x: f32) -> Vec<Line> {
    let mut out = Vec::new();
    for line in page_lines {
        let crossing = line.fragments.iter().any(|f| {
            let right = f.x + f.estimated_width();
            f.x < split_x - COLUMN_EDGE_SLACK && right > split_x + COLUMN_EDGE_SLACK
        });
        if crossing {
            out.push(line);
            continue;
        }
        let (lefts, rights): (Vec<_>, Vec<_>) = line
            .fragments
            .iter()
            .cloned()
            .partition(|f| f.x + f.estimated_width() / 2.0 < split_x);
        if lefts.is_empty() || rights.is_empty() {
            out.push(line);
        } else {
            out.push(rebuild_from_fragments(&line, lefts));
            out.push(rebuild_from_fragments(&line, rights));
        }
    }
    out
}

/// Rebuild one side of a split row, recomputing the per-line aggregates.
fn rebuild_from_fragments(source: &Line, fragments: Vec<crate::types::Fragment>) -> Line {
    let min_x = fragments.iter().map(|f| f.x).fold(f32::MAX, f32::min);
    let max_x = fragments.iter().map(|f| f.x).fold(f32::MIN, f32::max);
    let font_size = fragments.iter().map(|f| f.font_size).fold(0.0_f32, f32::max);
    let summed: f32 = fragments.iter().map(|f| f.estimated_width()).sum();
    let text = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Line {
        id: source.id,
        page_index: source.page_index,
        page_width: source.page_width,
        page_height: source.page_height,
        x: min_x,
        y: source.y,
        font_size,
        estimated_width: (max_x - min_x).max(summed),
        text,
        fragments,
        column: None,
    }
}

/// Detect a two-column split on one page.
///
/// A row qualifies when its largest fragment-center gap reaches the
/// threshold with the left side ending before 55% of the page width and the
/// right side starting past 33%. The page is two-column when enough rows
/// qualify; the split is the median of the qualifying gap midpoints.
pub(crate) fn detect_column_split(page_lines: &[Line]) -> Option<f32> {
    let first = page_lines.first()?;
    let page_width = first.page_width;
    if page_width <= 0.0 {
        return None;
    }
    let min_gap = COLUMN_MIN_GAP.min(page_width * COLUMN_MIN_GAP_FRACTION);

    let mut midpoints: Vec<f32> = Vec::new();
    for line in page_lines {
        if let Some(mid) = row_gap_midpoint(line, min_gap, page_width) {
            midpoints.push(mid);
        }
    }

    let needed = COLUMN_MIN_GAP_ROWS.max((page_lines.len() as f32 * COLUMN_MIN_GAP_ROW_RATIO).ceil() as usize);
    if midpoints.len() < needed {
        return None;
    }

    midpoints.sort_by(f32::total_cmp);
    let split_x = midpoints[midpoints.len() / 2];

    // Both sides must span most of the page vertically, or the "columns"
    // are just the cell gaps of a table.
    let span = |side_of: &dyn Fn(f32) -> bool| -> f32 {
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for line in page_lines {
            for f in &line.fragments {
                if side_of(f.x + f.estimated_width() / 2.0) {
                    min_y = min_y.min(f.y);
                    max_y = max_y.max(f.y);
                }
            }
        }
        if max_y > min_y { max_y - min_y } else { 0.0 }
    };
    let page_span = span(&|_| true);
    if page_span <= 0.0 {
        return None;
    }
    let left_span = span(&|c| c < split_x);
    let right_span = span(&|c| c >= split_x);
    if left_span < page_span * COLUMN_MIN_VERTICAL_SPAN || right_span < page_span * COLUMN_MIN_VERTICAL_SPAN {
        return None;
    }
    Some(split_x)
}

/// The qualifying gap midpoint of one row, if any.
fn row_gap_midpoint(line: &Line, min_gap: f32, page_width: f32) -> Option<f32> {
    if line.fragments.len() < 2 {
        return None;
    }
    // Fragments are already sorted by x from assembly.
    let centers: Vec<f32> = line
        .fragments
        .iter()
        .map(|f| f.x + f.estimated_width() / 2.0)
        .collect();

    let mut best: Option<(f32, usize)> = None;
    for (i, pair) in centers.windows(2).enumerate() {
        let gap = pair[1] - pair[0];
        if gap >= min_gap && best.map(|(g, _)| gap > g).unwrap_or(true) {
            best = Some((gap, i));
        }
    }
    let (_, split_idx) = best?;

    let left_max_right = line.fragments[..=split_idx]
        .iter()
        .map(|f| f.x + f.estimated_width())
        .fold(f32::MIN, f32::max);
    let right_min_left = line.fragments[split_idx + 1..]
        .iter()
        .map(|f| f.x)
        .fold(f32::MAX, f32::min);

    if left_max_right < page_width * COLUMN_LEFT_MAX_RIGHT && right_min_left > page_width * COLUMN_RIGHT_MIN_LEFT {
        Some((left_max_right + right_min_left) / 2.0)
    } else {
        None
    }
}

/// Tag each line: wholly left, wholly right, or straddling (no column).
fn assign_columns(page_lines: &mut [Line], split_x: f32) {
    for line in page_lines.iter_mut() {
        line.column = if line.right() <= split_x + COLUMN_EDGE_SLACK {
            Some(Column::Left)
        } else if line.x >= split_x - COLUMN_EDGE_SLACK {
            Some(Column::Right)
        } else {
            None
        };
    }
}

/// Emit one two-column page in reading order: straddlers above the column
/// content first (top matter), then the whole left column, then the whole
/// right column, then the remaining straddlers. Within every group order is
/// y descending.
fn order_two_column_page(page_lines: Vec<Line>) -> Vec<Line> {
    let column_top_y = page_lines
        .iter()
        .filter(|l| l.column.is_some())
        .map(|l| l.y)
        .fold(f32::MIN, f32::max);

    let mut top_matter: Vec<Line> = Vec::new();
    let mut left: Vec<Line> = Vec::new();
    let mut right: Vec<Line> = Vec::new();
    let mut trailing: Vec<Line> = Vec::new();

    for line in page_lines {
        match line.column {
            Some(Column::Left) => left.push(line),
            Some(Column::Right) => right.push(line),
            None if line.y > column_top_y => top_matter.push(line),
            None => trailing.push(line),
        }
    }

    let y_desc = |a: &Line, b: &Line| b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x));
    top_matter.sort_by(y_desc);
    left.sort_by(y_desc);
    right.sort_by(y_desc);
    trailing.sort_by(y_desc);

    let mut out = top_matter;
    out.extend(left);
    out.extend(right);
    out.extend(trailing);
    out
}
