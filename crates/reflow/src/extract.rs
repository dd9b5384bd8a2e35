//! Collaborator boundaries: the glyph-extraction backend and the page
//! rasterizer. Both are external processes; all pipeline errors that can
//! actually happen originate here or at the output write.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::types::ExtractedDocument;

/// Default program name of the fragment-extraction helper.
pub const DEFAULT_EXTRACTOR_PROGRAM: &str = "pdf-fragments";

/// Program used to rasterize pages for `pdf2png` (poppler-utils).
const RASTERIZER_PROGRAM: &str = "pdftoppm";

/// Yields the positioned text fragments of a PDF.
#[async_trait]
pub trait GlyphExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument>;
}

/// The default backend: spawns an external helper that prints the
/// fragment JSON (`{pages: [{pageIndex, width, height, fragments}]}`) on
/// stdout.
#[derive(Debug, Clone)]
pub struct JsonProcessExtractor {
    program: String,
}

impl JsonProcessExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for JsonProcessExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTOR_PROGRAM)
    }
}

#[async_trait]
impl GlyphExtractor for JsonProcessExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::BackendMissing {
                    program: self.program.clone(),
                },
                _ => Error::BackendFailed {
                    program: self.program.clone(),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(Error::BackendFailed {
                program: self.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let doc: ExtractedDocument = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::MalformedExtraction(format!("undecodable backend JSON: {e}")))?;
        validate_document(doc)
    }
}

/// Enforce the fragment invariants and normalize fragment text. Fragments
/// that are empty after normalization are dropped; non-finite geometry is
/// fatal.
pub(crate) fn validate_document(mut doc: ExtractedDocument) -> Result<ExtractedDocument> {
    for page in &mut doc.pages {
        if !page.width.is_finite() || !page.height.is_finite() || page.width <= 0.0 || page.height <= 0.0 {
            return Err(Error::MalformedExtraction(format!(
                "page {} has invalid dimensions {}x{}",
                page.page_index, page.width, page.height
            )));
        }
        for frag in &page.fragments {
            if !frag.x.is_finite() || !frag.y.is_finite() || !frag.font_size.is_finite() {
                return Err(Error::MalformedExtraction(format!(
                    "page {} has a fragment with non-finite coordinates",
                    page.page_index
                )));
            }
        }
        page.fragments.retain_mut(|frag| {
            frag.text = normalize_fragment_text(&frag.text);
            !frag.text.is_empty()
        });
    }
    let fragment_count: usize = doc.pages.iter().map(|p| p.fragments.len()).sum();
    tracing::debug!(pages = doc.pages.len(), fragment_count, "extraction validated");
    Ok(doc)
}

/// Normalize one fragment's text: collapse whitespace runs, strip control
/// characters, convert a trailing soft hyphen to `-` (so the paragraph
/// merger can re-join the word halves) and drop interior ones.
pub(crate) fn normalize_fragment_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut cleaned = String::with_capacity(text.len());
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '\u{00AD}' => {
                let at_end = chars[i + 1..].iter().all(|c| c.is_whitespace());
                if at_end {
                    cleaned.push('-');
                }
            }
            c if c.is_control() && c != '\t' => {}
            _ => cleaned.push(ch),
        }
    }
    crate::layout::text::normalize_spacing(&cleaned)
}

/// Rasterize each page of a PDF to `<out_dir>/page-N.png` at the given DPI
/// using a poppler-style rasterizer.
pub async fn rasterize_to_png(pdf: &Path, out_dir: &Path, dpi: u32) -> Result<()> {
    tokio::fs::create_dir_all(out_dir).await.map_err(|e| Error::OutputUnwritable {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let prefix = out_dir.join("page");
    let output = Command::new(RASTERIZER_PROGRAM)
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg(pdf)
        .arg(&prefix)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::BackendMissing {
                program: RASTERIZER_PROGRAM.to_string(),
            },
            _ => Error::BackendFailed {
                program: RASTERIZER_PROGRAM.to_string(),
                stderr: e.to_string(),
            },
        })?;

    if !output.status.success() {
        return Err(Error::BackendFailed {
            program: RASTERIZER_PROGRAM.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
