//! Line assembly: folding a page's fragments into visual rows.

use std::collections::BTreeMap;

use crate::types::{ExtractedDocument, Fragment, Line};

use super::constants::{LINE_Y_BUCKET_SIZE, NOISE_Y_FACTOR};
use super::text::normalize_spacing;

/// Bucket every page's fragments by rounded y and build one [`Line`] per
/// non-empty bucket.
///
/// Fragments whose y exceeds `page_height × 2.5` are extraction noise and
/// are dropped. Buckets are sorted by x ascending; the resulting lines are
/// globally ordered by `(page asc, y desc, x asc)`. Negative y values
/// bucket like any other — downstream consumers detect that regime from
/// the document profile, not here.
pub(crate) fn assemble_lines(doc: &ExtractedDocument) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for page in &doc.pages {
        // i64 bucket keys keep the BTreeMap ordering exact for negative y.
        let mut buckets: BTreeMap<i64, Vec<&Fragment>> = BTreeMap::new();
        for frag in &page.fragments {
            if frag.y > page.height * NOISE_Y_FACTOR {
                continue;
            }
            let key = (frag.y / LINE_Y_BUCKET_SIZE).round() as i64;
            buckets.entry(key).or_default().push(frag);
        }

        for (key, mut frags) in buckets {
            frags.sort_by(|a, b| a.x.total_cmp(&b.x));
            if let Some(line) = finalize_line(page.page_index, page.width, page.height, key, &frags) {
                lines.push(line);
            }
        }
    }

    lines.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then_with(|| b.y.total_cmp(&a.y))
            .then_with(|| a.x.total_cmp(&b.x))
    });

    for (i, line) in lines.iter_mut().enumerate() {
        line.id = i as u32;
    }

    tracing::debug!(line_count = lines.len(), "line assembly: lines built");
    lines
}

/// Build one line from a bucket's fragments, left-to-right.
fn finalize_line(
    page_index: usize,
    page_width: f32,
    page_height: f32,
    bucket_key: i64,
    frags: &[&Fragment],
) -> Option<Line> {
    let texts: Vec<String> = frags
        .iter()
        .map(|f| normalize_spacing(&f.text))
        .filter(|t| !t.is_empty())
        .collect();
    if texts.is_empty() {
        return None;
    }

    let min_x = frags.iter().map(|f| f.x).fold(f32::MAX, f32::min);
    let max_x = frags.iter().map(|f| f.x).fold(f32::MIN, f32::max);
    let font_size = frags.iter().map(|f| f.font_size).fold(0.0_f32, f32::max);
    let summed_width: f32 = frags.iter().map(|f| f.estimated_width()).sum();
    let estimated_width = (max_x - min_x).max(summed_width);

    Some(Line {
        id: 0,
        page_index,
        page_width,
        page_height,
        x: min_x,
        y: bucket_key as f32 * LINE_Y_BUCKET_SIZE,
        font_size,
        estimated_width,
        text: texts.join(" "),
        fragments: frags.iter().map(|f| (*f).clone()).collect(),
        column: None,
    })
}
