//! pdf2html command: extract fragments, run the layout pipeline, write
//! the HTML document.

use std::path::Path;

use anyhow::{Context, Result};
use reflow::{GlyphExtractor, JsonProcessExtractor};

pub async fn pdf2html(pdf: &Path, out: &Path) -> Result<()> {
    // Fail on unreadable input before spawning the backend so the message
    // names the real problem.
    tokio::fs::metadata(pdf)
        .await
        .map_err(|e| reflow::Error::InputUnreadable {
            path: pdf.to_path_buf(),
            source: e,
        })?;

    let extractor = JsonProcessExtractor::default();
    let doc = extractor
        .extract(pdf)
        .await
        .with_context(|| format!("extraction failed for '{}'", pdf.display()))?;

    tracing::debug!(pages = doc.pages.len(), "extraction complete, running layout pipeline");
    let html = reflow::render_document(&doc);

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| reflow::Error::OutputUnwritable {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    tokio::fs::write(out, html)
        .await
        .map_err(|e| reflow::Error::OutputUnwritable {
            path: out.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(out = %out.display(), "HTML written");
    Ok(())
}
