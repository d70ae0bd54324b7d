//! Error types shared by every pass.
//!
//! Only structural problems are errors. Bad input lines, entries with
//! incomplete linguistic data and duplicate rows are skipped and counted by
//! the pass that meets them; they never surface here.

use std::path::PathBuf;

/// Result type used throughout the crate
pub type Result<T, E = LexiconError> = std::result::Result<T, E>;

/// Fatal errors that abort a pass
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    /// A part of speech name that is not verb, noun or adjective
    #[error("unsupported part of speech: {0}")]
    UnsupportedPos(String),

    /// A required input file does not exist
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error while reading an input or writing the store
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error while reading the store or a configuration file
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// CSV error while reading the frequency corpus
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl LexiconError {
    /// Fail with [`LexiconError::MissingInput`] unless `path` exists
    pub fn require_file(path: &std::path::Path) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(LexiconError::MissingInput(path.to_path_buf()))
        }
    }
}
