//! CLI error types.

use thiserror::Error;

/// Failures reading command input.
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file or stdin could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path, or `stdin`.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Input was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
