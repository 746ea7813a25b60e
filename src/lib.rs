//! # mdpress
//!
//! A CJK-aware Markdown whitespace normalizer with a Pandoc docx
//! conversion pipeline around it.
//!
//! Word-wrap and prose authoring leave single spaces around CJK text that
//! downstream converters render as visible gaps. mdpress removes exactly
//! those cosmetic spaces while never touching structural whitespace:
//! fenced code, display math, table column alignment, and Markdown
//! heading/blockquote/list prefixes all pass through byte-identical.
//!
//! ## Quick Start
//!
//! ```
//! let output = mdpress::normalize("数据 123 和 < 5")?;
//! assert_eq!(output, "数据123和<5");
//! # Ok::<(), mdpress::Error>(())
//! ```
//!
//! Full conversion pipeline:
//!
//! ```no_run
//! use mdpress::ConvertOptions;
//!
//! let options = ConvertOptions::new("templates/style.docx")
//!     .with_lua_filter("filters/layout.lua");
//! let outcome = mdpress::convert_file("report.md", &options)?;
//! println!("wrote {}", outcome.output.display());
//! # Ok::<(), mdpress::Error>(())
//! ```

pub mod classify;
pub mod convert;
pub mod error;
pub mod frontmatter;
pub mod normalize;
pub mod protect;
pub mod rules;

// Re-exports
pub use convert::{convert_file, ConvertOptions, ConvertOutcome};
pub use error::{Error, Result};
pub use normalize::{
    normalize, normalize_with_options, normalize_with_report, NormalizeOptions, NormalizeReport,
};

use std::path::Path;

/// Reads a Markdown file and returns its normalized text.
///
/// # Example
///
/// ```no_run
/// let normalized = mdpress::normalize_file("report.md")?;
/// std::fs::write("report.normalized.md", normalized)?;
/// # Ok::<(), mdpress::Error>(())
/// ```
pub fn normalize_file(path: impl AsRef<Path>) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    normalize(&content)
}

/// Builder for configuring and running normalization.
///
/// # Example
///
/// ```
/// use mdpress::Mdpress;
///
/// let output = Mdpress::new().cjk_only().normalize("数据 123 和 1 rad")?;
/// assert_eq!(output, "数据123和1 rad");
/// # Ok::<(), mdpress::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mdpress {
    options: NormalizeOptions,
}

impl Mdpress {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            options: NormalizeOptions::default(),
        }
    }

    /// Restricts rewriting to soft-wrap joining and CJK adjacency rules.
    pub fn cjk_only(mut self) -> Self {
        self.options = NormalizeOptions {
            nfc: self.options.nfc,
            parallel: self.options.parallel,
            ..NormalizeOptions::cjk_only()
        };
        self
    }

    /// Enables the Unicode NFC pre-pass.
    pub fn with_nfc(mut self) -> Self {
        self.options.nfc = true;
        self
    }

    /// Disables parallel line processing.
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalizes a document with the configured options.
    pub fn normalize(&self, input: &str) -> Result<String> {
        normalize_with_options(input, &self.options)
    }

    /// Normalizes a document and reports what was done.
    pub fn normalize_with_report(&self, input: &str) -> Result<(String, NormalizeReport)> {
        normalize_with_report(input, &self.options)
    }

    /// Reads a file and normalizes its content.
    pub fn normalize_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        self.normalize(&content)
    }
}
