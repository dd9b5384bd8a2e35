//! reflow: semantic HTML reconstruction for scholarly PDFs.
//!
//! A PDF carries only geometric evidence — positioned glyph runs with font
//! sizes — and none of the structure a reader perceives. This crate
//! recovers that structure from geometry and text alone: it assembles
//! fragments into lines, suppresses page artifacts (running headers,
//! page numbers, stamps), restores column-aware reading order, detaches
//! and links footnotes, finds the title, classifies headings, bullets,
//! code, captions, tables and references, merges wrapped paragraphs, and
//! renders the result as a clean semantic HTML document.
//!
//! The transform is pure and deterministic: the same extracted input
//! yields byte-identical HTML. I/O lives at the edges — the
//! [`GlyphExtractor`] backend that produces fragments and the caller that
//! writes the output.
//!
//! ```no_run
//! use std::path::Path;
//! use reflow::{GlyphExtractor, JsonProcessExtractor};
//!
//! # async fn run() -> reflow::Result<()> {
//! let extractor = JsonProcessExtractor::default();
//! let doc = extractor.extract(Path::new("paper.pdf")).await?;
//! let html = reflow::render_document(&doc);
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod formula;
mod html;
pub(crate) mod layout;
mod types;

pub use error::{Error, Result};
pub use extract::{DEFAULT_EXTRACTOR_PROGRAM, GlyphExtractor, JsonProcessExtractor, rasterize_to_png};
pub use formula::{FormulaReconstructor, NoopFormulaReconstructor};
pub use types::{Block, ExtractedDocument, Footnote, Fragment, ListItem, Page, TableBlock};

/// Run the layout pipeline and return the ordered semantic blocks.
pub fn document_to_blocks(doc: &ExtractedDocument) -> Vec<Block> {
    layout::document_to_blocks_impl(doc, &NoopFormulaReconstructor)
}

/// Like [`document_to_blocks`], with a custom formula-reconstruction
/// collaborator for detached math fragments.
pub fn document_to_blocks_with(doc: &ExtractedDocument, formula: &dyn FormulaReconstructor) -> Vec<Block> {
    layout::document_to_blocks_impl(doc, formula)
}

/// Convert an extracted document to a complete HTML string.
pub fn render_document(doc: &ExtractedDocument) -> String {
    html::render_blocks(&document_to_blocks(doc))
}

/// Convert with a custom formula collaborator.
pub fn render_document_with(doc: &ExtractedDocument, formula: &dyn FormulaReconstructor) -> String {
    html::render_blocks(&document_to_blocks_with(doc, formula))
}
