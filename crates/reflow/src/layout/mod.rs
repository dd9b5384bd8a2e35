//! The layout reconstruction pipeline: a linear series of pure
//! transformations from positioned fragments to semantic blocks.
//!
//! Stage order matters: lines are assembled, artifacts removed, columns
//! ordered, footnotes segregated, the title detected, markers linked, and
//! only then are roles assigned and blocks built. Every stage is total on
//! degenerate input.

pub(crate) mod artifacts;
pub(crate) mod classify;
pub(crate) mod columns;
pub(crate) mod constants;
pub(crate) mod footnotes;
pub(crate) mod lines;
pub(crate) mod paragraphs;
pub(crate) mod profile;
pub(crate) mod tables;
pub(crate) mod text;
pub(crate) mod title;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::formula::FormulaReconstructor;
use crate::types::{Block, ExtractedDocument, Line, ListItem};

use classify::{ClassifiedLine, LineRole};
use footnotes::FootnoteEntry;
use profile::DocumentProfile;

/// Run the full pipeline and produce the ordered block sequence.
pub(crate) fn document_to_blocks_impl(doc: &ExtractedDocument, formula: &dyn FormulaReconstructor) -> Vec<Block> {
    let lines = lines::assemble_lines(doc);
    if lines.is_empty() {
        return Vec::new();
    }
    let profile = DocumentProfile::compute(&lines);
    let outcome = artifacts::filter_artifacts(lines, &profile);
    let ordered = columns::sort_reading_order(outcome.lines);
    let (mut body, notes) = footnotes::segregate_footnotes(ordered, &profile);

    let title = title::detect_title(&body, &profile);
    if let Some(t) = &title {
        body.retain(|l| !t.consumed.contains(&l.id));
    }

    footnotes::link_footnote_markers(&mut body, &notes);

    let classified = classify::classify_lines(body, &profile);
    let mut blocks = Vec::new();
    if let Some(t) = title {
        blocks.push(Block::Title(t.text));
    }
    blocks.extend(build_blocks(classified));
    blocks.extend(reconstructed_formulas(&outcome.detached_math, formula));
    if !notes.is_empty() {
        blocks.push(Block::FootnoteSection(notes.into_iter().map(FootnoteEntry::into_footnote).collect()));
    }
    tracing::debug!(blocks = blocks.len(), "pipeline produced block sequence");
    blocks
}

/// Hand each page's detached math fragments to the (optional) formula
/// collaborator; the default no-op contributes nothing.
fn reconstructed_formulas(detached: &[Line], formula: &dyn FormulaReconstructor) -> Vec<Block> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < detached.len() {
        let page = detached[i].page_index;
        let mut frags = Vec::new();
        while i < detached.len() && detached[i].page_index == page {
            frags.extend(detached[i].fragments.iter().cloned());
            i += 1;
        }
        if let Some(text) = formula.reconstruct(&frags) {
            out.push(Block::Paragraph(text));
        }
    }
    out
}

static CODE_NUMBER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}\s+").unwrap());
static REF_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(\d{1,3})\]").unwrap());

/// Fold the classified lines into blocks.
fn build_blocks(classified: Vec<ClassifiedLine>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let n = classified.len();
    let mut i = 0;

    while i < n {
        let ClassifiedLine { line, role } = &classified[i];
        match role {
            LineRole::Consumed | LineRole::TableRow => {
                i += 1;
            }
            LineRole::Heading(level) => {
                blocks.push(Block::Heading {
                    level: *level,
                    text: line.text.clone(),
                });
                i += 1;
            }
            LineRole::LabeledHeading { level, label_len } => {
                let label = line.text[..*label_len].trim_end_matches(':').to_string();
                blocks.push(Block::Heading {
                    level: *level,
                    text: label,
                });
                let opening = line.text[*label_len..].trim().to_string();
                i += 1;
                i = flush_paragraph(&classified, i, opening, &mut blocks);
            }
            LineRole::ParagraphStart => {
                let opening = line.text.clone();
                i += 1;
                i = flush_paragraph(&classified, i, opening, &mut blocks);
            }
            LineRole::ParagraphContinue => {
                // An orphaned continuation (its opener was removed) still
                // reads as a paragraph.
                let opening = line.text.clone();
                i += 1;
                i = flush_paragraph(&classified, i, opening, &mut blocks);
            }
            LineRole::Bullet => {
                let anchor_x = line.x;
                let mut items = Vec::new();
                while i < n && classified[i].role == LineRole::Bullet && (classified[i].line.x - anchor_x).abs() <= 2.0
                {
                    let text = classified[i].line.text.trim_start_matches('\u{2022}').trim().to_string();
                    items.push(text);
                    i += 1;
                }
                blocks.push(Block::BulletList(items));
            }
            LineRole::NumberedItem => {
                let mut items = Vec::new();
                while i < n && classified[i].role == LineRole::NumberedItem {
                    items.push(ListItem {
                        anchor: None,
                        text: classified[i].line.text.clone(),
                    });
                    i += 1;
                }
                blocks.push(Block::OrderedList(items));
            }
            LineRole::CodeLine => {
                let mut code_lines = Vec::new();
                while i < n && classified[i].role == LineRole::CodeLine {
                    let stripped = CODE_NUMBER_PREFIX_RE.replace(&classified[i].line.text, "").into_owned();
                    code_lines.push(stripped);
                    i += 1;
                }
                blocks.push(Block::CodeBlock(code_lines.join("\n")));
            }
            LineRole::CaptionStart => {
                let mut caption = line.text.clone();
                i += 1;
                while i < n && classified[i].role == LineRole::CaptionContinue {
                    paragraphs::append_continuation(&mut caption, &classified[i].line.text);
                    i += 1;
                }
                if classify::is_table_caption(&caption) {
                    i = flush_table(&classified, i, caption, &mut blocks);
                } else {
                    blocks.push(Block::Paragraph(caption));
                }
            }
            LineRole::CaptionContinue => {
                // Orphaned caption continuation: plain paragraph.
                let opening = line.text.clone();
                i += 1;
                i = flush_paragraph(&classified, i, opening, &mut blocks);
            }
            LineRole::ReferenceItem => {
                let mut items = Vec::new();
                while i < n && classified[i].role == LineRole::ReferenceItem {
                    let mut text = classified[i].line.text.clone();
                    i += 1;
                    while i < n && classified[i].role == LineRole::ParagraphContinue {
                        paragraphs::append_continuation(&mut text, &classified[i].line.text);
                        i += 1;
                    }
                    let anchor = REF_ANCHOR_RE
                        .captures(&text)
                        .and_then(|c| c.get(1))
                        .and_then(|m| m.as_str().parse::<u32>().ok());
                    items.push(ListItem {
                        anchor,
                        text: unescape_reference_entities(&text),
                    });
                }
                blocks.push(Block::OrderedList(items));
            }
        }
    }
    blocks
}

/// Consume continuation lines into an open paragraph buffer and emit it.
fn flush_paragraph(classified: &[ClassifiedLine], mut i: usize, opening: String, blocks: &mut Vec<Block>) -> usize {
    let mut buf = opening;
    while i < classified.len() && classified[i].role == LineRole::ParagraphContinue {
        paragraphs::append_continuation(&mut buf, &classified[i].line.text);
        i += 1;
    }
    let text = paragraphs::dedup_sentence_prefix(&buf);
    if !text.is_empty() {
        blocks.push(Block::Paragraph(text));
    }
    i
}

/// Consume the table rows that follow a table caption and emit the table
/// (or fall back to paragraphs when no grid emerges).
fn flush_table(classified: &[ClassifiedLine], mut i: usize, caption: String, blocks: &mut Vec<Block>) -> usize {
    let mut rows: Vec<&Line> = Vec::new();
    while i < classified.len() && classified[i].role == LineRole::TableRow {
        rows.push(&classified[i].line);
        i += 1;
    }
    match tables::build_table(&caption, &rows) {
        Some(table) => blocks.push(Block::Table(table)),
        None => {
            blocks.push(Block::Paragraph(caption));
            for row in rows {
                blocks.push(Block::Paragraph(row.text.clone()));
            }
        }
    }
    i
}

/// References sometimes arrive with already-escaped HTML entities; undo
/// them so the renderer's own escaping yields the intended characters.
fn unescape_reference_entities(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::NoopFormulaReconstructor;
    use crate::types::{Fragment, Page};

    fn frag(text: &str, x: f32, y: f32, font_size: f32) -> Fragment {
        Fragment {
            text: text.to_string(),
            x,
            y,
            font_size,
            width: None,
        }
    }

    #[test]
    fn test_empty_document_is_total() {
        let doc = ExtractedDocument { pages: vec![] };
        assert!(document_to_blocks_impl(&doc, &NoopFormulaReconstructor).is_empty());
    }

    #[test]
    fn test_minimal_document_produces_title_and_paragraph() {
        let mut fragments = vec![frag("A Study Of Interesting Things", 150.0, 720.0, 18.0)];
        for i in 0..12 {
            fragments.push(frag(
                "ordinary body prose that flows across the page and keeps going",
                72.0,
                640.0 - i as f32 * 14.0,
                10.0,
            ));
        }
        let doc = ExtractedDocument {
            pages: vec![Page {
                page_index: 0,
                width: 612.0,
                height: 792.0,
                fragments,
            }],
        };
        let blocks = document_to_blocks_impl(&doc, &NoopFormulaReconstructor);
        assert_eq!(blocks.first(), Some(&Block::Title("A Study Of Interesting Things".to_string())));
        assert!(blocks.iter().any(|b| matches!(b, Block::Paragraph(_))));
    }

    #[test]
    fn test_unescape_reference_entities() {
        assert_eq!(unescape_reference_entities("a &lt;em&gt; b &amp; c"), "a <em> b & c");
    }
}
