//! String literal and quoted identifier lexing.
//!
//! String literals are bounded by `'` with `''` encoding one literal quote.
//! Quoted identifiers are bounded by `"`. Both are single-line; running into
//! a newline or the end of input records an unterminated-literal violation
//! and yields an `Unknown` token so the parser can keep going.
//!
//! When the previous token was the `DotNet` or `Automation` keyword, the
//! following `"..."` is a type-literal payload: the lexer pushes the
//! matching context for the duration of the scan and preserves the interior
//! byte for byte, apostrophes, braces and dots inside it touch neither the
//! counters nor the context stack. The parser takes the payload apart under
//! its own grammar.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Lexes a `'...'` string literal.
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor.advance();

        loop {
            if self.cursor.is_at_end() {
                self.report_unterminated("string literal", "end of input");
                return self.make_token(TokenKind::Unknown);
            }
            match self.cursor.current_char() {
                '\'' => {
                    if self.cursor.peek_char(1) == '\'' {
                        // Doubled quote: one literal apostrophe.
                        self.cursor.advance();
                        self.cursor.advance();
                    } else {
                        self.cursor.advance();
                        return self.make_token(TokenKind::StringLit);
                    }
                }
                '\n' => {
                    self.report_unterminated("string literal", "end of line");
                    return self.make_token(TokenKind::Unknown);
                }
                _ => self.cursor.advance(),
            }
        }
    }

    /// Lexes a `"..."` quoted identifier or a DotNet/Automation payload.
    pub(crate) fn lex_quoted(&mut self) -> Token {
        let type_literal = self.take_type_literal();
        let what = match type_literal {
            Some(_) => "type literal",
            None => "quoted identifier",
        };
        if let Some(context) = type_literal {
            self.push_context(context);
        }

        self.cursor.advance();
        loop {
            if self.cursor.is_at_end() {
                self.report_unterminated(what, "end of input");
                if type_literal.is_some() {
                    self.pop_context();
                }
                return self.make_token(TokenKind::Unknown);
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\n' => {
                    self.report_unterminated(what, "end of line");
                    if type_literal.is_some() {
                        self.pop_context();
                    }
                    return self.make_token(TokenKind::Unknown);
                }
                _ => self.cursor.advance(),
            }
        }

        if type_literal.is_some() {
            self.pop_context();
        }
        self.make_token(TokenKind::QuotedIdent)
    }
}
