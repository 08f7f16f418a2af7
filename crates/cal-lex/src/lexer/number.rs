//! Numeric literal lexing.
//!
//! C/AL has two numeric forms: integers (`[0-9]+`) and decimals
//! (`[0-9]+.[0-9]+`). Object IDs and field numbers are plain integers; the
//! parser validates their ranges. A dot is part of the number only when a
//! digit follows, so `1..5` stays `1` `..` `5`.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes an integer or decimal literal.
    pub(crate) fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
            return self.make_token(TokenKind::Decimal);
        }

        self.make_token(TokenKind::Integer)
    }
}
