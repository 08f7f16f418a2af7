//! Token definitions.
//!
//! A [`Token`] pairs a [`TokenKind`] with the exact source substring it was
//! scanned from and its position. The `value` field is sensitive content:
//! it may name customer fields and business logic, and must pass through
//! `cal_util::sanitize` before appearing in any outward-facing message.

use cal_util::{Keyword, Span};

/// The kind of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident,
    /// Quoted identifier: `"Customer No."` (value keeps the quotes).
    QuotedIdent,
    /// Integer literal: `[0-9]+`.
    Integer,
    /// Decimal literal: `[0-9]+.[0-9]+`.
    Decimal,
    /// String literal bounded by `'`, with `''` encoding one quote.
    StringLit,
    /// A reserved word, sub-tagged with the keyword it spells.
    Keyword(Keyword),

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    At,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    /// AL-style preprocessor marker such as `#pragma` or `#region`.
    PreprocMarker,
    /// Anything the lexer could not classify; the parser sees these and
    /// recovers, the lexer never aborts.
    Unknown,
    /// End-of-input sentinel; always the last token of a stream.
    Eof,
}

impl TokenKind {
    /// Stable, grep-friendly name for trace output and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENT",
            TokenKind::QuotedIdent => "QUOTED_IDENT",
            TokenKind::Integer => "INTEGER",
            TokenKind::Decimal => "DECIMAL",
            TokenKind::StringLit => "STRING",
            TokenKind::Keyword(_) => "KEYWORD",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::ColonColon => "COLON_COLON",
            TokenKind::Dot => "DOT",
            TokenKind::DotDot => "DOT_DOT",
            TokenKind::At => "AT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Assign => "ASSIGN",
            TokenKind::PlusAssign => "PLUS_ASSIGN",
            TokenKind::MinusAssign => "MINUS_ASSIGN",
            TokenKind::StarAssign => "STAR_ASSIGN",
            TokenKind::SlashAssign => "SLASH_ASSIGN",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Le => "LE",
            TokenKind::Ge => "GE",
            TokenKind::PreprocMarker => "PREPROC",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Eof => "EOF",
        }
    }
}

/// A single lexed token.
///
/// Invariant: `end - start == value.len()`, and `line`/`column` are the
/// 1-based position of `start` recomputed from the source. The
/// `position` validator cross-checks both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// What was recognized.
    pub kind: TokenKind,
    /// The exact source substring (sensitive; sanitize before display).
    pub value: String,
    /// Line number of the first byte (1-based).
    pub line: u32,
    /// Column number of the first byte (1-based).
    pub column: u32,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Token {
    /// The token's source span.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end, self.line, self.column)
    }

    /// The keyword this token spells, if it is a keyword token.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    /// True for the end-of-input sentinel.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_span() {
        let token = Token {
            kind: TokenKind::Ident,
            value: "Amount".to_string(),
            line: 3,
            column: 5,
            start: 40,
            end: 46,
        };
        let span = token.span();
        assert_eq!(span.start, 40);
        assert_eq!(span.end, 46);
        assert_eq!(span.len(), token.value.len());
        assert_eq!(span.line, 3);
    }

    #[test]
    fn test_token_keyword_accessor() {
        let token = Token {
            kind: TokenKind::Keyword(Keyword::Begin),
            value: "BEGIN".to_string(),
            line: 1,
            column: 1,
            start: 0,
            end: 5,
        };
        assert_eq!(token.keyword(), Some(Keyword::Begin));
        assert!(!token.is_eof());
    }

    #[test]
    fn test_kind_names_are_stable() {
        assert_eq!(TokenKind::Ident.name(), "IDENT");
        assert_eq!(TokenKind::Keyword(Keyword::If).name(), "KEYWORD");
        assert_eq!(TokenKind::Assign.name(), "ASSIGN");
        assert_eq!(TokenKind::Eof.name(), "EOF");
    }
}
