//! Identifier and keyword lexing.

use cal_util::keyword_from_str;

use crate::lexer::core::is_ident_continue;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes an identifier or keyword.
    ///
    /// Keyword recognition is case-insensitive. The hyphenated
    /// `OBJECT-PROPERTIES` section keyword is the one reserved word that is
    /// not a plain identifier, so it gets an explicit lookahead: `OBJECT`
    /// followed directly by `-PROPERTIES` is consumed as a single token.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        if self
            .cursor
            .slice_from(self.token_start)
            .eq_ignore_ascii_case("OBJECT")
            && self.cursor.current_char() == '-'
            && self.hyphen_continues_object_properties()
        {
            // `-` plus `PROPERTIES`.
            for _ in 0.."-PROPERTIES".len() {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        match keyword_from_str(text) {
            Some(kw) => self.make_token(TokenKind::Keyword(kw)),
            None => self.make_token(TokenKind::Ident),
        }
    }

    fn hyphen_continues_object_properties(&self) -> bool {
        let rest = self.cursor.remaining();
        if rest.len() < "-PROPERTIES".len() {
            return false;
        }
        let (head, tail) = rest.split_at("-PROPERTIES".len());
        head.eq_ignore_ascii_case("-PROPERTIES")
            && !tail.chars().next().map(is_ident_continue).unwrap_or(false)
    }

    /// Lexes an AL-style `#directive` marker.
    ///
    /// The directive word is scanned inside a dedicated context so traces
    /// show the mode switch; the whole `#word` becomes one token. A bare `#`
    /// is an unknown token.
    pub(crate) fn lex_preproc(&mut self) -> Token {
        self.cursor.advance();
        if !self.cursor.current_char().is_ascii_alphabetic() {
            return self.make_token(TokenKind::Unknown);
        }

        self.push_context(crate::context::LexerContext::PreprocDirective);
        while self.cursor.current_char().is_ascii_alphabetic() {
            self.cursor.advance();
        }
        self.pop_context();

        self.make_token(TokenKind::PreprocMarker)
    }
}
