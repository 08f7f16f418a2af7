//! Redaction of source content in outward-facing text.
//!
//! C/AL sources name customers, fields and business processes, so raw token
//! values must never appear in diagnostics, reports or logs. Every
//! human-readable message passes through [`sanitize_value`], which replaces
//! anything that is not a recognized safe lexeme with a fixed-format
//! placeholder carrying only the length.
//!
//! Safe lexemes are exactly: keywords from the fixed table, and short
//! (three characters or fewer) punctuation/operator strings such as `;`,
//! `:=` or `<>`.

use crate::keywords::keyword_from_str;

/// Returns true if `value` may appear verbatim in an outward-facing message.
///
/// # Examples
///
/// ```
/// use cal_util::is_safe_lexeme;
///
/// assert!(is_safe_lexeme("BEGIN"));
/// assert!(is_safe_lexeme(":="));
/// assert!(!is_safe_lexeme("CustomerNo"));
/// ```
pub fn is_safe_lexeme(value: &str) -> bool {
    if keyword_from_str(value).is_some() {
        return true;
    }
    !value.is_empty()
        && value.len() <= 3
        && value.bytes().all(|b| b.is_ascii_punctuation())
}

/// Replace a potentially sensitive value with a length-only placeholder.
///
/// Safe lexemes pass through untouched.
///
/// # Examples
///
/// ```
/// use cal_util::sanitize_value;
///
/// assert_eq!(sanitize_value("END"), "END");
/// assert_eq!(sanitize_value("SecretField"), "[content sanitized, 11 chars]");
/// ```
pub fn sanitize_value(value: &str) -> String {
    if is_safe_lexeme(value) {
        value.to_string()
    } else {
        format!("[content sanitized, {} chars]", value.chars().count())
    }
}

/// Like [`sanitize_value`], with the source offset included in the
/// placeholder for grep-able trace output.
pub fn sanitize_value_at(value: &str, offset: usize) -> String {
    if is_safe_lexeme(value) {
        value.to_string()
    } else {
        format!(
            "[content sanitized, {} chars at offset {}]",
            value.chars().count(),
            offset
        )
    }
}

/// Characters escaped in markdown-targeted text, backslash first.
///
/// The ordering matters: escaping the backslash before the other characters
/// guarantees `\X` becomes `\\\X` rather than `\\X`, which keeps the escape
/// unambiguous when the result is concatenated into a report.
const MARKDOWN_SPECIALS: [char; 11] = ['\\', '|', '*', '_', '`', '[', ']', '<', '>', '#', '~'];

/// Escape markdown-significant characters with a backslash.
///
/// # Examples
///
/// ```
/// use cal_util::escape_markdown;
///
/// assert_eq!(escape_markdown("a|b"), "a\\|b");
/// assert_eq!(escape_markdown("test\\*v"), "test\\\\\\*v");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_safe() {
        assert!(is_safe_lexeme("BEGIN"));
        assert!(is_safe_lexeme("begin"));
        assert!(is_safe_lexeme("OBJECT-PROPERTIES"));
        assert!(is_safe_lexeme("DotNet"));
    }

    #[test]
    fn test_short_punctuation_is_safe() {
        for lexeme in [";", ":=", "<>", "<=", "::", "+=", "{", "}"] {
            assert!(is_safe_lexeme(lexeme), "{lexeme} should be safe");
        }
    }

    #[test]
    fn test_identifiers_are_not_safe() {
        assert!(!is_safe_lexeme("Customer"));
        assert!(!is_safe_lexeme("x"));
        assert!(!is_safe_lexeme("No."));
        assert!(!is_safe_lexeme(""));
        // Four punctuation characters exceed the short-operator limit.
        assert!(!is_safe_lexeme("...."));
    }

    #[test]
    fn test_sanitize_value_placeholder() {
        assert_eq!(
            sanitize_value("GLEntry"),
            "[content sanitized, 7 chars]"
        );
        assert_eq!(sanitize_value("END"), "END");
        assert_eq!(sanitize_value(";"), ";");
    }

    #[test]
    fn test_sanitize_value_counts_chars_not_bytes() {
        assert_eq!(
            sanitize_value("Gæld"),
            "[content sanitized, 4 chars]"
        );
    }

    #[test]
    fn test_sanitize_value_at() {
        assert_eq!(
            sanitize_value_at("GLEntry", 42),
            "[content sanitized, 7 chars at offset 42]"
        );
        assert_eq!(sanitize_value_at("END", 42), "END");
    }

    #[test]
    fn test_escape_markdown_full_set() {
        assert_eq!(
            escape_markdown("|*_`[]<>#"),
            "\\|\\*\\_\\`\\[\\]\\<\\>\\#"
        );
        assert_eq!(escape_markdown("~"), "\\~");
    }

    #[test]
    fn test_escape_markdown_backslash_first() {
        // A backslash followed by a special escapes to an escaped backslash
        // followed by an escaped special.
        assert_eq!(escape_markdown("test\\*v"), "test\\\\\\*v");
    }

    #[test]
    fn test_escape_markdown_plain_text_unchanged() {
        assert_eq!(escape_markdown("plain text 123"), "plain text 123");
    }
}
