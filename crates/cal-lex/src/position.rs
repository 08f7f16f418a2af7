//! Token-position validator.
//!
//! Cross-checks every emitted token against the original source: the span
//! `start..end` must reproduce the token's value exactly, and recomputing
//! the 1-based line/column from `start` must match what the lexer recorded.
//! The validator reports; it never repairs. Its messages carry positions and
//! token-kind names only, no source content.

use crate::token::{Token, TokenKind};

/// Outcome of validating a token stream against its source.
#[derive(Clone, Debug, Default)]
pub struct PositionValidation {
    /// True when no errors were found (warnings do not fail validation).
    pub is_valid: bool,
    /// Hard mismatches between tokens and source.
    pub errors: Vec<String>,
    /// Oddities worth surfacing that do not invalidate the stream.
    pub warnings: Vec<String>,
}

/// Validate `tokens` as produced from `source`.
pub fn validate_token_positions(source: &str, tokens: &[Token]) -> PositionValidation {
    let mut result = PositionValidation {
        is_valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    for (index, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            if index + 1 != tokens.len() {
                result
                    .errors
                    .push(format!("token {index} (EOF) is not the last token"));
            }
            continue;
        }

        if token.end < token.start
            || token.end > source.len()
            || !source.is_char_boundary(token.start)
            || !source.is_char_boundary(token.end)
        {
            result.errors.push(format!(
                "token {index} ({}): span {}..{} is not a valid source range",
                token.kind.name(),
                token.start,
                token.end
            ));
            continue;
        }

        if token.end - token.start != token.value.len() {
            result.errors.push(format!(
                "token {index} ({}): span length {} does not match value length {}",
                token.kind.name(),
                token.end - token.start,
                token.value.len()
            ));
        }

        if source[token.start..token.end] != token.value {
            result.errors.push(format!(
                "token {index} ({}): value does not match source at {}..{}",
                token.kind.name(),
                token.start,
                token.end
            ));
        }

        let (line, column) = position_of(source, token.start);
        if line != token.line || column != token.column {
            result.errors.push(format!(
                "token {index} ({}): recorded position {}:{} but offset {} is at {}:{}",
                token.kind.name(),
                token.line,
                token.column,
                token.start,
                line,
                column
            ));
        }

        if token.value.is_empty() {
            result.warnings.push(format!(
                "token {index} ({}): empty value",
                token.kind.name()
            ));
        }
    }

    match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof => {}
        _ => result
            .warnings
            .push("token stream is not EOF-terminated".to_string()),
    }

    result.is_valid = result.errors.is_empty();
    result
}

/// Recompute the 1-based line/column of a byte offset.
fn position_of(source: &str, offset: usize) -> (u32, u32) {
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = source[line_start..offset].chars().count() as u32 + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    #[test]
    fn test_lexer_output_validates() {
        let source = "OBJECT Codeunit 50000 Test\n{\n  CODE\n  {\n  }\n}\n";
        let tokens = Lexer::new(source).tokenize();
        let validation = validate_token_positions(source, &tokens);
        assert!(validation.is_valid, "errors: {:?}", validation.errors);
    }

    #[test]
    fn test_detects_value_mismatch() {
        let source = "BEGIN END";
        let mut tokens = Lexer::new(source).tokenize();
        tokens[0].value = "BEGIM".to_string();
        let validation = validate_token_positions(source, &tokens);
        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 1);
        // The raw value must never appear in the message.
        assert!(!validation.errors[0].contains("BEGIM"));
    }

    #[test]
    fn test_detects_position_drift() {
        let source = "BEGIN\nEND";
        let mut tokens = Lexer::new(source).tokenize();
        tokens[1].line = 1;
        let validation = validate_token_positions(source, &tokens);
        assert!(!validation.is_valid);
        assert!(validation.errors[0].contains("recorded position"));
    }

    #[test]
    fn test_detects_bad_span() {
        let source = "END";
        let mut tokens = Lexer::new(source).tokenize();
        tokens[0].end = 999;
        let validation = validate_token_positions(source, &tokens);
        assert!(!validation.is_valid);
    }

    #[test]
    fn test_warns_on_truncated_stream() {
        let source = "END";
        let mut tokens = Lexer::new(source).tokenize();
        tokens.pop(); // drop the EOF sentinel
        let validation = validate_token_positions(source, &tokens);
        assert!(validation.is_valid);
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_position_of_multiline() {
        let source = "ab\ncd\nef";
        assert_eq!(position_of(source, 0), (1, 1));
        assert_eq!(position_of(source, 3), (2, 1));
        assert_eq!(position_of(source, 7), (3, 2));
    }
}
