//! Contextual single-space collapse rules.
//!
//! Each rule deletes exactly one space or tab when the characters on both
//! sides match a fixed adjacency pattern. Every pattern requires a
//! non-whitespace character on each side of the collapsed space, so runs of
//! two or more whitespace characters never match and multi-space prose or
//! alignment spacing is left alone.
//!
//! Rules are applied in a fixed order, and each rule re-runs to a fixed
//! point within its own pattern before the next one starts: a deletion can
//! shift adjacency and expose a fresh match for the same rule.

use crate::normalize::NormalizeOptions;
use regex::Regex;
use std::sync::LazyLock;

/// Character class covering CJK Unified Ideographs (U+4E00–U+9FFF), CJK
/// Symbols and Punctuation (U+3000–U+303F), and Halfwidth and Fullwidth
/// Forms (U+FF00–U+FFEF). Fixed block ranges, not a script-property lookup.
const CJK_CLASS: &str = r"[\x{4E00}-\x{9FFF}\x{3000}-\x{303F}\x{FF00}-\x{FFEF}]";

/// Returns true for characters of the fixed CJK class above.
pub(crate) fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}')
}

static RE_SPACE_AFTER_CJK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({CJK_CLASS})[ \t](\S)")).unwrap());

static RE_SPACE_BEFORE_CJK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(\S)[ \t]({CJK_CLASS})")).unwrap());

static RE_DIGIT_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9])[ \t]([A-Za-z°µμ%‰])").unwrap());

static RE_COMPARATOR_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([<>≤≥≈])[ \t]([0-9])").unwrap());

static RE_COMMA_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",[ \t]([+\-−]?[0-9])").unwrap());

fn collapse(re: &Regex, body: &str, replacement: &str) -> String {
    let mut text = body.to_string();
    loop {
        let next = re.replace_all(&text, replacement).into_owned();
        if next == text {
            return text;
        }
        text = next;
    }
}

/// Rule 1: CJK character/punctuation, one space/tab, any non-whitespace.
pub fn collapse_space_after_cjk(body: &str) -> String {
    collapse(&RE_SPACE_AFTER_CJK, body, "${1}${2}")
}

/// Rule 2: any non-whitespace, one space/tab, CJK character/punctuation.
pub fn collapse_space_before_cjk(body: &str) -> String {
    collapse(&RE_SPACE_BEFORE_CJK, body, "${1}${2}")
}

/// Rule 3: decimal digit, one space/tab, letter or unit symbol (°, µ, μ, %, ‰).
pub fn collapse_digit_unit(body: &str) -> String {
    collapse(&RE_DIGIT_UNIT, body, "${1}${2}")
}

/// Rule 4: comparator (<, >, ≤, ≥, ≈), one space/tab, decimal digit.
pub fn collapse_comparator_digit(body: &str) -> String {
    collapse(&RE_COMPARATOR_DIGIT, body, "${1}${2}")
}

/// Rule 5: comma, one space/tab, optionally signed decimal digit.
pub fn collapse_comma_number(body: &str) -> String {
    collapse(&RE_COMMA_NUMBER, body, ",${1}")
}

/// Applies the enabled rule families to a line body, in fixed order.
pub(crate) fn apply_rules(body: &str, options: &NormalizeOptions) -> String {
    let mut text = body.to_string();
    if options.cjk_adjacency {
        text = collapse_space_after_cjk(&text);
        text = collapse_space_before_cjk(&text);
    }
    if options.unit_compaction {
        text = collapse_digit_unit(&text);
    }
    if options.comparator_compaction {
        text = collapse_comparator_digit(&text);
    }
    if options.comma_compaction {
        text = collapse_comma_number(&text);
    }
    text
}
