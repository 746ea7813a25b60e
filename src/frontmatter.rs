//! YAML front-matter handling.
//!
//! The conversion pipeline only needs one thing from front-matter: the
//! `title:` value, which parameterizes the cover/TOC merge step. No YAML
//! parser is involved; the block is scanned line by line.

/// Extracts the `title:` value from a leading front-matter block.
///
/// The block must start at the beginning of the document with a `---` line
/// and end at the next `---` (or `...`) line. Returns the first `title:`
/// value found inside it, with surrounding quotes stripped.
pub fn extract_title(input: &str) -> Option<String> {
    let mut lines = input.lines();

    if lines.next()?.trim_end() != "---" {
        return None;
    }

    for line in lines {
        let trimmed = line.trim();
        if trimmed == "---" || trimmed == "..." {
            return None;
        }
        if let Some(value) = trimmed.strip_prefix("title:") {
            let title = strip_quotes(value.trim());
            if title.is_empty() {
                return None;
            }
            return Some(title.to_string());
        }
    }

    None
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_plain() {
        let input = "---\ntitle: 年度报告\nauthor: x\n---\n\n正文";
        assert_eq!(extract_title(input).as_deref(), Some("年度报告"));
    }

    #[test]
    fn test_extract_title_quoted() {
        let input = "---\ntitle: \"季度 总结\"\n---\n正文";
        assert_eq!(extract_title(input).as_deref(), Some("季度 总结"));
    }

    #[test]
    fn test_no_front_matter() {
        assert_eq!(extract_title("# 标题\n\n正文"), None);
    }

    #[test]
    fn test_title_outside_block_ignored() {
        let input = "---\nauthor: x\n---\ntitle: 不算数";
        assert_eq!(extract_title(input), None);
    }

    #[test]
    fn test_unterminated_block_still_scans() {
        // Matches the permissive original: the closing fence is not
        // required for the title line to be found.
        let input = "---\ntitle: 报告\n正文继续";
        assert_eq!(extract_title(input).as_deref(), Some("报告"));
    }

    #[test]
    fn test_empty_title_value() {
        assert_eq!(extract_title("---\ntitle:\n---\n"), None);
    }
}
