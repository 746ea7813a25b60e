//! Verbatim-block protection for fenced code and display math.
//!
//! Regions that must survive rewriting byte-for-byte are lifted out of the
//! document before any whitespace rule runs and swapped back in afterwards.
//! Each captured region is replaced by a placeholder token built from a NUL
//! marker plus its position in the capture list, so the token alphabet is
//! disjoint from printable Markdown content.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Marker prefix shared by every placeholder token.
pub(crate) const PLACEHOLDER_PREFIX: &str = "\u{0}PROT_";

// Lazy matching: the first closing delimiter terminates the block, and an
// unterminated delimiter simply never matches, leaving the content subject
// to normal line rewriting.
static RE_FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static RE_DISPLAY_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$.*?\$\$").unwrap());

static RE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x00PROT_([0-9]+)\x00").unwrap());

/// Extracts fenced code blocks and display-math blocks from `input`.
///
/// Returns the text with each protected region replaced by a placeholder
/// token, plus the ordered list of captured region texts. Fenced code is
/// captured first, then display math over the already-substituted text;
/// both passes append to the same capture list.
pub fn protect_blocks(input: &str) -> (String, Vec<String>) {
    let mut blocks = Vec::new();
    let text = capture_pattern(&RE_FENCED_CODE, input, &mut blocks);
    let text = capture_pattern(&RE_DISPLAY_MATH, &text, &mut blocks);
    (text, blocks)
}

fn capture_pattern(re: &Regex, input: &str, blocks: &mut Vec<String>) -> String {
    re.replace_all(input, |caps: &Captures| {
        let token = format!("{}{}\u{0}", PLACEHOLDER_PREFIX, blocks.len());
        blocks.push(caps[0].to_string());
        token
    })
    .into_owned()
}

/// Replaces every placeholder token in `input` with its captured block.
///
/// Fails closed on inconsistent pipeline state: a placeholder referencing
/// an index outside the capture list, or a captured block that no
/// placeholder consumed, is an internal fault and must never be emitted or
/// dropped silently.
pub fn restore_blocks(input: &str, blocks: &[String]) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut consumed = vec![false; blocks.len()];
    let mut last = 0;

    for m in RE_PLACEHOLDER.find_iter(input) {
        let digits = m
            .as_str()
            .strip_prefix(PLACEHOLDER_PREFIX)
            .and_then(|s| s.strip_suffix('\u{0}'))
            .unwrap_or_default();
        // An index too large for usize is necessarily out of range.
        let index: usize = digits.parse().unwrap_or(usize::MAX);

        let block = blocks
            .get(index)
            .ok_or(Error::PlaceholderOutOfRange {
                index,
                count: blocks.len(),
            })?;

        output.push_str(&input[last..m.start()]);
        output.push_str(block);
        consumed[index] = true;
        last = m.end();
    }
    output.push_str(&input[last..]);

    if let Some(index) = consumed.iter().position(|done| !done) {
        return Err(Error::UnrestoredBlock(index));
    }

    Ok(output)
}
