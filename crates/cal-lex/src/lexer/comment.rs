//! Trivia skipping.
//!
//! Whitespace, `//` line comments and `{ ... }` block comments never reach
//! the token stream. Brace comments are context-sensitive: a `{` is a
//! comment opener only where braces are not structural, at the top level
//! outside any object, and inside `CODE` sections. Everywhere else
//! (object bodies, property blocks, field/key/control rows) braces delimit
//! structure and are emitted as tokens. A `{` that the section lookahead
//! has already claimed as a section opener is structural regardless.

use crate::context::LexerContext;
use crate::trace::TraceEventKind;
use crate::Lexer;

impl<'src> Lexer<'src> {
    /// Skips whitespace and comments before the next token.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            if self.cursor.is_at_end() {
                return;
            }
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => self.cursor.advance(),
                '/' if self.cursor.peek_char(1) == '/' => self.skip_line_comment(),
                '{' if self.in_comment_context() => self.skip_brace_comment(),
                _ => return,
            }
        }
    }

    fn in_comment_context(&self) -> bool {
        if self.section_pending() {
            return false;
        }
        matches!(
            self.top_context(),
            LexerContext::Normal | LexerContext::CodeSection
        )
    }

    fn skip_line_comment(&mut self) {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }

        let bytes = self.cursor.position() - start;
        self.trace_event(
            line,
            column,
            start,
            TraceEventKind::Skip {
                what: "line comment",
                bytes,
            },
        );
    }

    /// Skips a `{ ... }` comment. C/AL brace comments do not nest; the first
    /// `}` closes. An unterminated comment simply runs to the end of input;
    /// the balance counters were never touched, so clean-exit stays accurate.
    fn skip_brace_comment(&mut self) {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        self.cursor.advance();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '}' {
            self.cursor.advance();
        }
        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }

        let bytes = self.cursor.position() - start;
        self.trace_event(
            line,
            column,
            start,
            TraceEventKind::Skip {
                what: "block comment",
                bytes,
            },
        );
    }
}
