//! Parse error type and the diagnostic boundary.
//!
//! A [`ParseError`] carries two things: a message that was sanitized at
//! construction time and is safe to surface anywhere, and the raw token the
//! error is attributed to. The token stays server-internal, the only parts
//! of it that may cross a serialization boundary are the three numeric
//! fields exposed by [`ParseError::to_diagnostic`].

use thiserror::Error;

use cal_lex::Token;

/// A recorded parse error.
///
/// Errors never abort the parser; they accumulate in source order and the
/// parse continues under recovery.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Sanitized, presentation-ready message.
    pub message: String,
    /// The raw token the error is attributed to. Internal: contains
    /// unsanitized source content.
    token: Token,
}

impl ParseError {
    pub(crate) fn new(message: String, token: Token) -> Self {
        Self { message, token }
    }

    /// Line of the attributed token (1-based).
    pub fn line(&self) -> u32 {
        self.token.line
    }

    /// Column of the attributed token (1-based).
    pub fn column(&self) -> u32 {
        self.token.column
    }

    /// Length of the attributed token's raw value, in bytes.
    pub fn value_len(&self) -> usize {
        self.token.value.len()
    }

    /// The raw token. Server-internal only: never serialize this or any
    /// non-numeric part of it across a process boundary.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Project this error onto the LSP-shaped diagnostic value.
    ///
    /// Only the sanitized message and numeric position metadata cross over;
    /// the raw token does not.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let line = self.token.line.saturating_sub(1);
        let character = self.token.column.saturating_sub(1);
        Diagnostic {
            severity: Severity::Error,
            range: Range {
                start: Position { line, character },
                end: Position {
                    line,
                    character: self.token.column + self.token.value.len() as u32 - 1,
                },
            },
            message: self.message.clone(),
            source: "cal",
        }
    }
}

/// Diagnostic severity; the parser only produces errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

/// Zero-based position, LSP convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Zero-based half-open range, LSP convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// The value handed to LSP glue. Contains nothing that needs redaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    pub source: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_lex::TokenKind;

    fn token(value: &str, line: u32, column: u32) -> Token {
        Token {
            kind: TokenKind::Ident,
            value: value.to_string(),
            line,
            column,
            start: 0,
            end: value.len(),
        }
    }

    #[test]
    fn test_error_display_is_message_only() {
        let err = ParseError::new(
            "Expected ; after variable declaration".to_string(),
            token("SecretName", 3, 7),
        );
        assert_eq!(err.to_string(), "Expected ; after variable declaration");
        assert!(!err.to_string().contains("SecretName"));
    }

    #[test]
    fn test_numeric_accessors() {
        let err = ParseError::new("x".to_string(), token("Amount", 12, 4));
        assert_eq!(err.line(), 12);
        assert_eq!(err.column(), 4);
        assert_eq!(err.value_len(), 6);
    }

    #[test]
    fn test_diagnostic_projection() {
        let err = ParseError::new("msg".to_string(), token("Amount", 12, 4));
        let diag = err.to_diagnostic();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.range.start, Position { line: 11, character: 3 });
        // end.character = column + len - 1 in zero-based characters.
        assert_eq!(diag.range.end, Position { line: 11, character: 9 });
        assert_eq!(diag.message, "msg");
        assert_eq!(diag.source, "cal");
    }
}
