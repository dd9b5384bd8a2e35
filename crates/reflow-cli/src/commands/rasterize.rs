//! pdf2png command: rasterize pages via the external poppler-style tool.

use std::path::Path;

use anyhow::{Context, Result};

const RASTER_DPI: u32 = 300;

pub async fn pdf2png(pdf: &Path, out_dir: &Path) -> Result<()> {
    tokio::fs::metadata(pdf)
        .await
        .map_err(|e| reflow::Error::InputUnreadable {
            path: pdf.to_path_buf(),
            source: e,
        })?;

    reflow::rasterize_to_png(pdf, out_dir, RASTER_DPI)
        .await
        .with_context(|| format!("rasterization failed for '{}'", pdf.display()))?;
    Ok(())
}
