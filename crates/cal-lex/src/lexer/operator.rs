//! Operator and punctuation lexing.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes `:` into `::`, `:=` or a bare colon.
    pub(crate) fn lex_colon(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char(':') {
            self.make_token(TokenKind::ColonColon)
        } else if self.cursor.match_char('=') {
            self.make_token(TokenKind::Assign)
        } else {
            self.make_token(TokenKind::Colon)
        }
    }

    /// Lexes `.` into `..` or a bare dot.
    pub(crate) fn lex_dot(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('.') {
            self.make_token(TokenKind::DotDot)
        } else {
            self.make_token(TokenKind::Dot)
        }
    }

    /// Lexes an arithmetic operator or its compound-assignment form
    /// (`+` vs `+=` and so on).
    pub(crate) fn lex_compound(&mut self, plain: TokenKind, assign: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(assign)
        } else {
            self.make_token(plain)
        }
    }

    /// Lexes `<` into `<=`, `<>` or less-than.
    pub(crate) fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::Le)
        } else if self.cursor.match_char('>') {
            self.make_token(TokenKind::Ne)
        } else {
            self.make_token(TokenKind::Lt)
        }
    }

    /// Lexes `>` into `>=` or greater-than.
    pub(crate) fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::Ge)
        } else {
            self.make_token(TokenKind::Gt)
        }
    }
}
