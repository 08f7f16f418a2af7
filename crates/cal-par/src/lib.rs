//! cal-par - Recursive-descent parser for C/AL.
//!
//! The parser consumes the token stream the lexer produced, left to right,
//! and builds a [`CalDocument`]. It never throws for input errors: every
//! problem is recorded as a [`ParseError`] and recovery continues. Three
//! recovery strategies apply, in order of preference:
//!
//! 1. For a missing terminator (`;`, `THEN`, `DO`, `OF`, `END`, `)`, `:`),
//!    attribute the error to the end of the previous token and continue.
//!    This keeps reported line numbers on the line that needed the token,
//!    not the line where the next token happened to sit.
//! 2. For an unexpected token inside a delimited list, skip to the next
//!    separator or closer at the same nesting depth.
//! 3. For an unrecoverable construct, skip forward to the next `PROCEDURE`,
//!    `BEGIN`, `END` or closing `}` and resume there.
//!
//! Every recovery path consumes at least one token or closes its construct,
//! so the parser cannot loop.
//!
//! Expression parsing is Pratt-style; statements, declarations and section
//! parsing live in the sibling modules (`stmt`, `decl`, `object`).

pub mod ast;
pub mod error;

mod decl;
mod edge_cases;
mod expr;
mod object;
mod stmt;

use cal_lex::{Token, TokenKind};
use cal_util::{sanitize_value, Keyword};

pub use ast::{
    AssignOp, BinaryOp, CalDocument, CaseBranch, CodeSection, Control, ControlsBlock, DataType,
    Expression, ExpressionKind, Field, FieldsBlock, KeysBlock, Literal, Object, ObjectKind,
    Procedure, Property, PropertyBlock, RdlDataSection, Statement, StatementKind, TableKey,
    TokenId, UnaryOp, VariableDecl,
};
pub use error::{Diagnostic, ParseError, Position, Range, Severity};

/// Recursive-descent parser over a lexed token stream.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) errors: Vec<ParseError>,
}

impl Parser {
    /// Creates a parser over `tokens`.
    ///
    /// The stream is expected to be `Eof`-terminated, as the lexer produces
    /// it; a missing sentinel is synthesized so the cursor always has a
    /// resting place.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = !matches!(
            tokens.last(),
            Some(Token {
                kind: TokenKind::Eof,
                ..
            })
        );
        if needs_eof {
            let offset = tokens.last().map(|t| t.end).unwrap_or(0);
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token {
                kind: TokenKind::Eof,
                value: String::new(),
                line,
                column: 1,
                start: offset,
                end: offset,
            });
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the whole stream into a document.
    ///
    /// Always returns a document; accumulated errors are available through
    /// [`errors`](Parser::errors) afterwards.
    pub fn parse(&mut self) -> CalDocument {
        let start = self.pos;
        let mut document = CalDocument {
            object: None,
            variables: Vec::new(),
            procedures: Vec::new(),
            statements: Vec::new(),
            start_token: start,
            end_token: start,
        };

        while !self.at_eof() {
            let before = self.pos;

            if self.check_keyword(Keyword::Object) {
                match self.parse_object() {
                    Some(object) if document.object.is_none() => {
                        document.object = Some(object);
                    }
                    Some(_) => {
                        let token = self.tokens[before].clone();
                        self.errors.push(ParseError::new(
                            "Only one OBJECT declaration is allowed per file".to_string(),
                            token,
                        ));
                    }
                    None => {}
                }
            } else if self.check_keyword(Keyword::Var) {
                let mut variables = Vec::new();
                self.parse_var_block(&mut variables);
                document.variables.append(&mut variables);
            } else if self.check_keyword(Keyword::Procedure)
                || (self.check_keyword(Keyword::Local)
                    && self.peek_ahead(1).keyword() == Some(Keyword::Procedure))
            {
                if let Some(procedure) = self.parse_procedure() {
                    document.procedures.push(procedure);
                }
            } else {
                let stmt_start = self.pos;
                let statement = self.parse_statement();
                let progressed = self.pos > stmt_start;
                let had_semicolon = self.match_kind(TokenKind::Semicolon);
                if progressed || had_semicolon {
                    document.statements.push(statement);
                } else {
                    let message =
                        format!("Unexpected token {} at top level", self.describe_current());
                    self.error_at_current(message);
                    self.advance();
                }
            }

            if self.pos == before {
                // Hard progress guarantee.
                self.advance();
            }
        }

        document.end_token = self.pos;
        document
    }

    /// The accumulated parse errors, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The token array the parser operates on; AST nodes index into it.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consumes the parser, handing the token array and errors to the caller
    /// together with the span-query lifetime of the AST.
    pub fn into_parts(self) -> (Vec<Token>, Vec<ParseError>) {
        (self.tokens, self.errors)
    }

    // -------------------------------------------------------------------
    // Cursor primitives
    // -------------------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// The token just before the cursor. At the start of the stream this is
    /// the first token; callers only use it after consuming something.
    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    pub(crate) fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().keyword() == Some(keyword)
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// One-token lookahead: is the token after the current one a `{`?
    ///
    /// Pure function of the cursor position and the token array; used to
    /// tell section keywords from identifiers of the same spelling.
    pub(crate) fn is_followed_by_left_brace(&self) -> bool {
        self.peek_ahead(1).kind == TokenKind::LBrace
    }

    // -------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------

    /// Consume the expected token kind or record an error attributed to the
    /// end of the previous token (recovery strategy 1).
    pub(crate) fn consume_expected(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            self.error_at_previous(message.to_string());
            false
        }
    }

    /// Keyword-flavored [`consume_expected`](Parser::consume_expected).
    pub(crate) fn consume_expected_keyword(&mut self, keyword: Keyword, message: &str) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            self.error_at_previous(message.to_string());
            false
        }
    }

    pub(crate) fn error_at_previous(&mut self, message: String) {
        let token = self.previous().clone();
        self.errors.push(ParseError::new(message, token));
    }

    pub(crate) fn error_at_current(&mut self, message: String) {
        let token = self.peek().clone();
        self.errors.push(ParseError::new(message, token));
    }

    pub(crate) fn error_at_token(&mut self, index: TokenId, message: String) {
        let token = self.tokens[index.min(self.tokens.len() - 1)].clone();
        self.errors.push(ParseError::new(message, token));
    }

    /// Sanitized rendering of the current token for messages.
    pub(crate) fn describe_current(&self) -> String {
        Self::describe(self.peek())
    }

    /// Sanitized rendering of a token: keywords and short operators pass
    /// through, everything else becomes a length-only placeholder.
    pub(crate) fn describe(token: &Token) -> String {
        if token.is_eof() {
            "end of input".to_string()
        } else {
            sanitize_value(&token.value)
        }
    }

    /// The text a name-position token contributes (quoted identifiers are
    /// unquoted).
    pub(crate) fn name_text(token: &Token) -> String {
        match token.kind {
            TokenKind::QuotedIdent => token
                .value
                .trim_start_matches('"')
                .trim_end_matches('"')
                .to_string(),
            _ => token.value.clone(),
        }
    }
}
