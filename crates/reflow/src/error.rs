//! Error types for the reflow conversion pipeline.
//!
//! The core layout transform is total on well-formed input; every error in
//! this enum originates at an I/O boundary (reading the input, invoking the
//! extraction backend, writing the output).

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The PDF path could not be opened for reading.
    #[error("cannot read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external extraction (or rasterization) program is not installed.
    #[error("backend program '{program}' was not found; install it or put it on PATH")]
    BackendMissing { program: String },

    /// The external backend process exited non-zero.
    #[error("backend program '{program}' failed: {stderr}")]
    BackendFailed { program: String, stderr: String },

    /// The extractor produced output that violates the fragment invariants.
    #[error("malformed extraction output: {0}")]
    MalformedExtraction(String),

    /// Output directory creation or file write failed.
    #[error("cannot write output '{path}': {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
