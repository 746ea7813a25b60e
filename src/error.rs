//! Error types for the mdpress library.

use std::io;
use thiserror::Error;

/// Result type alias for mdpress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the mdpress library.
///
/// Normalization itself is total: malformed input (unterminated fences,
/// stray delimiters) is processed best-effort, never rejected. The only
/// error paths inside the engine are the restoration consistency faults,
/// which indicate a pipeline bug rather than a data problem.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A placeholder referenced a capture index outside the capture list.
    #[error("placeholder index {index} out of range ({count} protected blocks)")]
    PlaceholderOutOfRange { index: usize, count: usize },

    /// A captured block was never consumed during restoration.
    #[error("protected block {0} was never restored")]
    UnrestoredBlock(usize),

    /// Required external component (template, filter, tool) is missing.
    #[error("missing required component: {0}")]
    MissingComponent(String),

    /// The document conversion tool reported failure.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// The cover/TOC merge step reported failure.
    #[error("cover merge failed: {0}")]
    Merge(String),
}
