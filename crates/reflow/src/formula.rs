//! Optional formula reconstruction collaborator.
//!
//! Detached math fragments removed by the artifact filter can be handed to
//! an external model for reconstruction into plain text. The default
//! implementation declines every cluster, which leaves the pipeline fully
//! deterministic; the one known-formula regex normalization in the HTML
//! renderer is independent of this hook and always runs.

use crate::types::Fragment;

/// Reconstructs a plain-text formula from a cluster of detached math
/// fragments, or declines.
pub trait FormulaReconstructor: Send + Sync {
    /// Return the reconstructed formula text, or `None` to drop the
    /// fragments (the default behavior).
    fn reconstruct(&self, fragments: &[Fragment]) -> Option<String>;
}

/// The default collaborator: never reconstructs anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormulaReconstructor;

impl FormulaReconstructor for NoopFormulaReconstructor {
    fn reconstruct(&self, _fragments: &[Fragment]) -> Option<String> {
        None
    }
}
