//! # Normalization Pipeline
//!
//! A linear pipeline that removes cosmetic single spaces around CJK text
//! while leaving structural whitespace intact.
//!
//! ## Pipeline Stages
//!
//! 1. **Protection** - fenced code and display math lifted out behind placeholders
//! 2. **Soft-Wrap Joining** - line breaks between two CJK characters deleted
//! 3. **Per-Line Rewriting** - classification, prefix split, collapse rules
//! 4. **Restoration** - protected blocks swapped back in verbatim
//!
//! The join pass is sequential because it changes line boundaries; the
//! per-line stage has no cross-line dependency and can run in parallel.

use crate::classify::{classify_line, LineKind};
use crate::error::Result;
use crate::protect::{protect_blocks, restore_blocks};
use crate::rules;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Normalization configuration options.
///
/// The rule-family toggles fold the historical "full" and "CJK-only"
/// rule sets into one engine; use [`NormalizeOptions::cjk_only`] for the
/// narrow profile.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Delete line breaks between two CJK characters (soft-wrap joining).
    pub join_wrapped_lines: bool,
    /// Rules 1-2: collapse single spaces adjacent to CJK characters.
    pub cjk_adjacency: bool,
    /// Rule 3: collapse the space in digit-unit pairs ("1 rad").
    pub unit_compaction: bool,
    /// Rule 4: collapse the space after comparators ("< 1").
    pub comparator_compaction: bool,
    /// Rule 5: collapse the space after commas before numbers ("(0, 1)").
    pub comma_compaction: bool,
    /// Apply Unicode NFC normalization before any rewriting.
    pub nfc: bool,
    /// Process classified lines in parallel.
    pub parallel: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            join_wrapped_lines: true,
            cjk_adjacency: true,
            unit_compaction: true,
            comparator_compaction: true,
            comma_compaction: true,
            nfc: false,
            parallel: true,
        }
    }
}

impl NormalizeOptions {
    /// Creates options with default settings (all rule families on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the narrow profile: soft-wrap joining and CJK adjacency
    /// rules only, numeric spacing left untouched.
    pub fn cjk_only() -> Self {
        Self {
            unit_compaction: false,
            comparator_compaction: false,
            comma_compaction: false,
            ..Self::default()
        }
    }

    /// Enables the Unicode NFC pre-pass.
    pub fn with_nfc(mut self) -> Self {
        self.nfc = true;
        self
    }

    /// Disables parallel line processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Summary of what one normalization run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    /// Fenced code and display-math blocks protected from rewriting.
    pub protected_blocks: usize,
    /// Line breaks deleted by the CJK soft-wrap joiner.
    pub joined_line_breaks: usize,
    /// Lines seen after joining.
    pub lines_total: usize,
    /// Lines exempted by the table-like whitespace guard.
    pub lines_guarded: usize,
    /// Lines actually rewritten by the rule engine.
    pub lines_rewritten: usize,
    /// Net byte shrinkage of the document.
    pub bytes_removed: usize,
}

impl NormalizeReport {
    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Normalizes a Markdown document with default options.
///
/// Total over all inputs: malformed delimiters degrade to unprotected
/// content instead of failing. The only error path is an internal
/// restoration-consistency fault.
pub fn normalize(input: &str) -> Result<String> {
    normalize_with_options(input, &NormalizeOptions::default())
}

/// Normalizes a Markdown document with the given options.
pub fn normalize_with_options(input: &str, options: &NormalizeOptions) -> Result<String> {
    normalize_with_report(input, options).map(|(text, _)| text)
}

/// Normalizes a Markdown document and reports what was done.
pub fn normalize_with_report(
    input: &str,
    options: &NormalizeOptions,
) -> Result<(String, NormalizeReport)> {
    let mut report = NormalizeReport::default();

    let source: String = if options.nfc {
        input.nfc().collect()
    } else {
        input.to_string()
    };

    let (protected, blocks) = protect_blocks(&source);
    report.protected_blocks = blocks.len();
    debug!("protected {} verbatim blocks", blocks.len());

    let joined = if options.join_wrapped_lines {
        let (joined, count) = join_cjk_soft_wraps(&protected);
        report.joined_line_breaks = count;
        debug!("joined {} soft-wrapped CJK line breaks", count);
        joined
    } else {
        protected
    };

    let lines: Vec<&str> = joined.split('\n').collect();
    report.lines_total = lines.len();

    let outcomes: Vec<LineOutcome> = if options.parallel {
        lines
            .par_iter()
            .map(|line| process_line(line, options))
            .collect()
    } else {
        lines.iter().map(|line| process_line(line, options)).collect()
    };

    let mut rewritten = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            LineOutcome::Unchanged(text) => rewritten.push(text),
            LineOutcome::Guarded(text) => {
                report.lines_guarded += 1;
                rewritten.push(text);
            }
            LineOutcome::Rewritten(text) => {
                report.lines_rewritten += 1;
                rewritten.push(text);
            }
        }
    }

    let output = restore_blocks(&rewritten.join("\n"), &blocks)?;
    report.bytes_removed = source.len().saturating_sub(output.len());

    Ok((output, report))
}

enum LineOutcome {
    Unchanged(String),
    Guarded(String),
    Rewritten(String),
}

fn process_line(line: &str, options: &NormalizeOptions) -> LineOutcome {
    match classify_line(line) {
        LineKind::Placeholder | LineKind::TableSeparator => {
            LineOutcome::Unchanged(line.to_string())
        }
        LineKind::TableLike => LineOutcome::Guarded(line.to_string()),
        LineKind::Prefixed { prefix, body } => {
            let result = rules::apply_rules(body, options);
            if result == body {
                LineOutcome::Unchanged(line.to_string())
            } else {
                LineOutcome::Rewritten(format!("{prefix}{result}"))
            }
        }
        LineKind::Normal { body } => {
            let result = rules::apply_rules(body, options);
            if result == body {
                LineOutcome::Unchanged(line.to_string())
            } else {
                LineOutcome::Rewritten(result)
            }
        }
    }
}

/// Deletes every line break (`\n` or `\r\n`) that sits directly between
/// two CJK characters, merging wrapped continuations of one logical line.
///
/// Downstream converters render a soft wrap as a visible space; between
/// two CJK glyphs that space is always spurious, so the break is removed
/// at the source. Returns the joined text and the number of deleted breaks.
fn join_cjk_soft_wraps(input: &str) -> (String, usize) {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut last_kept: Option<char> = None;
    let mut joined = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let break_len = if c == '\n' {
            1
        } else if c == '\r' && chars.get(i + 1) == Some(&'\n') {
            2
        } else {
            0
        };

        if break_len > 0 {
            let left_cjk = last_kept.is_some_and(rules::is_cjk);
            let right_cjk = chars.get(i + break_len).copied().is_some_and(rules::is_cjk);
            if left_cjk && right_cjk {
                joined += 1;
                i += break_len;
                continue;
            }
        }

        output.push(c);
        last_kept = Some(c);
        i += 1;
    }

    (output, joined)
}
