//! Table reconstruction: caption-introduced row grouping, column inference
//! by x-center clustering, and re-splitting of cells the line assembler
//! merged.

use crate::types::{Line, TableBlock};

use super::constants::{TABLE_COLUMN_TOLERANCE_FONTS, TABLE_MAX_ROW_GAP_FONTS};
use super::profile::most_frequent_font_size;
use super::text::digit_ratio;

/// Collect the candidate row indices following a `Table N` caption: lines
/// on the same page, descending in small steps, overlapping the caption's
/// horizontal band (which grows as rows are accepted), and shaped like
/// cell rows.
pub(crate) fn collect_table_rows(lines: &[Line], caption_idx: usize) -> Vec<usize> {
    let caption = &lines[caption_idx];
    let mut band_left = caption.x;
    let mut band_right = caption.right();
    let mut last_y = caption.y;
    let mut rows = Vec::new();

    for (j, line) in lines.iter().enumerate().skip(caption_idx + 1) {
        if line.page_index != caption.page_index || line.y > last_y {
            break;
        }
        let max_gap = line.font_size.max(1.0) * TABLE_MAX_ROW_GAP_FONTS;
        if last_y - line.y > max_gap {
            break;
        }
        let slack = line.page_width * 0.1;
        let overlaps = line.x < band_right + slack && line.right() > band_left - slack;
        if !overlaps || !is_cell_row(line) {
            break;
        }
        rows.push(j);
        band_left = band_left.min(line.x);
        band_right = band_right.max(line.right());
        last_y = line.y;
    }
    rows
}

/// A row of table cells: several separated fragments, or numeric-dense
/// text that the assembler merged.
fn is_cell_row(line: &Line) -> bool {
    if line.fragments.len() >= 2 {
        let mut separated = 0usize;
        for pair in line.fragments.windows(2) {
            let gap = pair[1].x - (pair[0].x + pair[0].estimated_width());
            if gap >= line.font_size * 1.5 {
                separated += 1;
            }
        }
        if separated >= 1 {
            return true;
        }
    }
    digit_ratio(&line.text) >= 0.4
}

/// A positioned cell token used during column inference.
#[derive(Debug, Clone)]
struct CellToken {
    text: String,
    x: f32,
    width: f32,
}

impl CellToken {
    fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Reconstruct a table from its caption and candidate rows. Returns `None`
/// when no multi-column structure emerges (the caller falls back to
/// paragraph flow).
pub(crate) fn build_table(caption: &str, rows: &[&Line]) -> Option<TableBlock> {
    if rows.is_empty() {
        return None;
    }
    let font = most_frequent_font_size(rows.iter().map(|l| l.font_size)).max(1.0);
    let tolerance = font * TABLE_COLUMN_TOLERANCE_FONTS;

    let row_fragments: Vec<Vec<CellToken>> = rows.iter().map(|row| merged_fragments(row)).collect();

    // Column inference: cluster fragment x-centers across all rows.
    let mut centers: Vec<f32> = row_fragments.iter().flatten().map(CellToken::center).collect();
    if centers.is_empty() {
        return None;
    }
    centers.sort_by(f32::total_cmp);
    let mut centroids: Vec<f32> = Vec::new();
    let mut cluster: Vec<f32> = vec![centers[0]];
    for &c in &centers[1..] {
        if c - cluster.last().copied().unwrap_or(c) > tolerance {
            centroids.push(cluster.iter().sum::<f32>() / cluster.len() as f32);
            cluster = vec![c];
        } else {
            cluster.push(c);
        }
    }
    centroids.push(cluster.iter().sum::<f32>() / cluster.len() as f32);

    if centroids.len() < 2 {
        return None;
    }

    // Cell fill with re-splitting of assembler-merged runs.
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for fragments in &row_fragments {
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); centroids.len()];
        for frag in fragments {
            for token in split_tokens(frag, tolerance) {
                let col = nearest_centroid(&centroids, token.center());
                cells[col].push(token.text);
            }
        }
        grid.push(cells.into_iter().map(|tokens| tokens.join(" ")).collect());
    }

    // Leading rows whose populated cells are wordy rather than numeric are
    // the header.
    let header_len = grid
        .iter()
        .take(2)
        .take_while(|row| is_header_row(row))
        .count();
    let (header_rows, body_rows) = grid.split_at(header_len);

    Some(TableBlock {
        caption: caption.to_string(),
        header_rows: header_rows.to_vec(),
        body_rows: body_rows.to_vec(),
    })
}

/// Fragment list of one row with stray split-glyph fragments (a lone
/// letter hard against its neighbor) merged back together.
fn merged_fragments(row: &Line) -> Vec<CellToken> {
    let mut tokens: Vec<CellToken> = Vec::new();
    for frag in &row.fragments {
        let token = CellToken {
            text: frag.text.clone(),
            x: frag.x,
            width: frag.estimated_width(),
        };
        if let Some(prev) = tokens.last_mut() {
            let gap = token.x - (prev.x + prev.width);
            let glyph_split = gap <= row.font_size * 0.6
                && (prev.text.chars().count() == 1 && prev.text.chars().all(|c| c.is_alphabetic())
                    || token.text.chars().count() == 1 && token.text.chars().all(|c| c.is_alphabetic()));
            if glyph_split {
                prev.text.push_str(&token.text);
                prev.width = (token.x + token.width) - prev.x;
                continue;
            }
        }
        tokens.push(token);
    }
    tokens
}

/// Split a wide multi-token fragment into per-token cells positioned by
/// character offsets; narrow fragments stay whole.
fn split_tokens(frag: &CellToken, tolerance: f32) -> Vec<CellToken> {
    let words: Vec<&str> = frag.text.split_whitespace().collect();
    if words.len() < 2 || frag.width <= tolerance {
        return vec![frag.clone()];
    }
    let total_chars: usize = frag.text.chars().count();
    let per_char = frag.width / total_chars.max(1) as f32;

    let mut out = Vec::with_capacity(words.len());
    let mut offset = 0usize;
    for word in words {
        let start = frag.text[offset..].find(word).map(|p| offset + p).unwrap_or(offset);
        let chars_before = frag.text[..start].chars().count();
        let word_chars = word.chars().count();
        out.push(CellToken {
            text: word.to_string(),
            x: frag.x + chars_before as f32 * per_char,
            width: word_chars as f32 * per_char,
        });
        offset = start + word.len();
    }
    out
}

fn nearest_centroid(centroids: &[f32], center: f32) -> usize {
    let mut best = 0usize;
    let mut best_dist = f32::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let dist = (center - c).abs();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

fn is_header_row(row: &[String]) -> bool {
    let populated: Vec<&String> = row.iter().filter(|c| !c.is_empty()).collect();
    !populated.is_empty()
        && populated
            .iter()
            .all(|c| c.chars().any(|ch| ch.is_alphabetic()) && digit_ratio(c) < 0.5)
}
