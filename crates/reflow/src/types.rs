//! Core data types: the extracted input model and the semantic output model.

use serde::Deserialize;

/// A single positioned text run produced by the glyph-extraction backend.
///
/// Coordinates are PDF user space: lower-left origin, y grows upward.
/// Negative values occur in the wild and are preserved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    /// Glyph-run advance width, when the backend reports one.
    #[serde(default)]
    pub width: Option<f32>,
}

impl Fragment {
    /// Advance width: the backend-reported width when present, otherwise
    /// estimated from the character count at the average glyph aspect ratio.
    pub fn estimated_width(&self) -> f32 {
        self.width
            .unwrap_or_else(|| self.text.chars().count() as f32 * self.font_size * crate::layout::constants::CHAR_WIDTH_FACTOR)
    }
}

/// One page of positioned fragments.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_index: usize,
    pub width: f32,
    pub height: f32,
    pub fragments: Vec<Fragment>,
}

/// The full output of the glyph-extraction backend for one document.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedDocument {
    pub pages: Vec<Page>,
}

/// Column assignment on a two-column page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Left,
    Right,
}

/// Stable identity of an assembled line, used by later stages to remove or
/// rewrite specific lines without relying on reference equality.
pub(crate) type LineId = u32;

/// One visual row on a page: the fragments sharing a y-bucket.
#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub id: LineId,
    pub page_index: usize,
    pub page_width: f32,
    pub page_height: f32,
    /// Minimum fragment x on the line.
    pub x: f32,
    /// Bucket center (rounded y).
    pub y: f32,
    /// Maximum fragment font size on the line.
    pub font_size: f32,
    /// The larger of the x-spread and the summed per-fragment advance widths.
    pub estimated_width: f32,
    /// Space-joined, single-spaced concatenation of fragment texts.
    pub text: String,
    /// The ordered fragments that produced the line, retained for
    /// superscript-marker and cell-boundary analysis.
    pub fragments: Vec<Fragment>,
    pub column: Option<Column>,
}

impl Line {
    pub fn right(&self) -> f32 {
        self.x + self.estimated_width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.estimated_width / 2.0
    }
}

/// A single list entry, optionally anchored (reference items carry `ref-N`).
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Reference number for `id="ref-N"` anchors, when the item is a
    /// bibliography entry with a `[N]` marker.
    pub anchor: Option<u32>,
    pub text: String,
}

/// A reconstructed table: caption plus header and body row grids.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub caption: String,
    pub header_rows: Vec<Vec<String>>,
    pub body_rows: Vec<Vec<String>>,
}

/// One normalized footnote entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Footnote {
    /// Leading numeric marker, when the footnote has (or was inferred to
    /// have) one. Drives the `fn-N`/`fnref-N` anchor pair.
    pub number: Option<u32>,
    /// Full footnote text, marker included.
    pub text: String,
}

/// A semantic output block. The document is rendered as an ordered sequence
/// of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading { level: u8, text: String },
    Paragraph(String),
    BulletList(Vec<String>),
    OrderedList(Vec<ListItem>),
    CodeBlock(String),
    Table(TableBlock),
    FootnoteSection(Vec<Footnote>),
}
