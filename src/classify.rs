//! Per-line classification for the normalization pipeline.
//!
//! Every line is sorted into exactly one kind, evaluated in precedence
//! order. Placeholder-carrying lines and table separators pass through
//! untouched; structural Markdown prefixes are split off so only the body
//! is rewritten; lines whose body contains a run of two or more spaces are
//! exempted wholesale because such runs are the dominant signature of
//! Pandoc's whitespace-aligned table formats (simple/multiline/grid).

use crate::protect::PLACEHOLDER_PREFIX;
use regex::Regex;
use std::sync::LazyLock;

static RE_TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[\s\-:|]+\|").unwrap());

// Heading hashes plus an optional dotted numeric label ("1.", "1.2.3") and
// an optional chapter label.
static RE_HEADING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,6}\s+(?:(?:[0-9]+\.)+[0-9]*\s+)?(?:第\S*章\s+)?").unwrap()
});

static RE_QUOTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>\s*").unwrap());

static RE_LIST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ \t]*[*+-][ \t]+|[ \t]*[0-9]+\.[ \t]+)").unwrap());

static RE_TABLE_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S[ \t]{2,}\S").unwrap());

/// Classification of one `\n`-delimited line, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Carries a placeholder token; passed through unchanged.
    Placeholder,
    /// Pipe-delimited table separator (`|---|:---|`); passed through unchanged.
    TableSeparator,
    /// Starts with a heading/blockquote/list prefix; only the body is rewritten.
    Prefixed { prefix: &'a str, body: &'a str },
    /// Body contains a ≥2-space run between non-space characters; the whole
    /// line, prefix included, is passed through unchanged.
    TableLike,
    /// Plain body, fully subject to the rule engine.
    Normal { body: &'a str },
}

/// Classifies a single line.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.contains(PLACEHOLDER_PREFIX) {
        return LineKind::Placeholder;
    }
    if RE_TABLE_SEPARATOR.is_match(line) {
        return LineKind::TableSeparator;
    }

    let (prefix, body) = split_structural_prefix(line);

    if RE_TABLE_LIKE.is_match(body) {
        return LineKind::TableLike;
    }

    if prefix.is_empty() {
        LineKind::Normal { body }
    } else {
        LineKind::Prefixed { prefix, body }
    }
}

/// Splits a leading heading, blockquote, or list-item prefix off a line.
///
/// Returns `("", line)` when no structural prefix matches. Prefixes do not
/// nest: the first matching family wins and the remainder is the body.
fn split_structural_prefix(line: &str) -> (&str, &str) {
    for re in [&*RE_HEADING_PREFIX, &*RE_QUOTE_PREFIX, &*RE_LIST_PREFIX] {
        if let Some(m) = re.find(line) {
            if !m.is_empty() {
                return line.split_at(m.end());
            }
        }
    }
    ("", line)
}
