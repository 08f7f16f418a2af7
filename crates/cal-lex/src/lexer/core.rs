//! Core lexer implementation.
//!
//! The lexer consumes the source byte by byte and emits tokens while
//! maintaining the context stack and depth counters. It fails softly:
//! malformed input becomes an `Unknown` token or a clean-exit violation,
//! never a panic, and the stream always ends with `Eof`.

use cal_util::Keyword;

use crate::clean_exit::{CleanExitOptions, CleanExitResult, Violation, ViolationCategory};
use crate::context::{format_stack, DepthCounters, LexerContext};
use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use crate::trace::{TraceEvent, TraceEventKind, TraceSink};

/// Lexer for C/AL object text.
///
/// `tokenize` scans the whole buffer in one pass; afterwards
/// [`is_clean_exit`](Lexer::is_clean_exit) reports whether every opened
/// context was closed. Tokenizing twice yields identical output, all run
/// state is reset at entry.
pub struct Lexer<'src> {
    /// Character cursor over the source.
    pub(crate) cursor: Cursor<'src>,

    /// The context stack; the top names the current lexical mode.
    pub(crate) contexts: Vec<LexerContext>,

    /// Brace/paren/bracket depth counters.
    pub(crate) flags: DepthCounters,

    /// Violations recorded while scanning (unterminated literals,
    /// RDLDATA underflow). Balance violations are derived at check time.
    pub(crate) violations: Vec<Violation>,

    /// Optional observer for every lexer decision.
    trace: Option<Box<dyn TraceSink>>,

    /// Section context to push at the next `{`, set when a section keyword
    /// was recognized with a `{` ahead.
    pending_section: Option<LexerContext>,

    /// Type-literal context for the next `"..."`, set right after a
    /// `DotNet`/`Automation` keyword.
    pending_type_literal: Option<LexerContext>,

    /// Start position of the token currently being scanned.
    pub(crate) token_start: usize,
    token_start_line: u32,
    token_start_column: u32,

    /// True once `tokenize` has completed a run.
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            contexts: vec![LexerContext::Normal],
            flags: DepthCounters::default(),
            violations: Vec::new(),
            trace: None,
            pending_section: None,
            pending_type_literal: None,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            finished: false,
        }
    }

    /// Creates a lexer with a trace sink attached.
    pub fn with_trace(source: &'src str, sink: Box<dyn TraceSink>) -> Self {
        let mut lexer = Self::new(source);
        lexer.trace = Some(sink);
        lexer
    }

    /// Produces the full token list, terminated by an `Eof` sentinel.
    ///
    /// Restartable: calling again re-scans from the beginning and yields an
    /// identical stream.
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.reset();

        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            self.trace_event(
                token.line,
                token.column,
                token.start,
                TraceEventKind::Token {
                    kind: token.kind.name(),
                    value: token.value.clone(),
                },
            );
            self.apply_transitions(&token);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        self.finished = true;
        tokens
    }

    /// Checks the clean-exit invariant of the last `tokenize` run.
    ///
    /// Must be called after [`tokenize`](Lexer::tokenize); calling it
    /// earlier reports a stack-mismatch violation instead of panicking.
    pub fn is_clean_exit(&self, options: CleanExitOptions) -> CleanExitResult {
        let mut violations: Vec<Violation> = self
            .violations
            .iter()
            .filter(|v| {
                !(options.allow_rdldata_underflow
                    && v.category == ViolationCategory::RdldataUnderflow)
            })
            .cloned()
            .collect();

        if !self.finished {
            violations.push(Violation {
                category: ViolationCategory::StackMismatch,
                message: "clean-exit check before tokenize() completed".to_string(),
                expected: "completed tokenization run".to_string(),
                actual: "no run".to_string(),
            });
            return CleanExitResult::from_violations(violations);
        }

        if self.contexts != [LexerContext::Normal] {
            violations.push(Violation {
                category: ViolationCategory::StackMismatch,
                message: "context stack not fully unwound".to_string(),
                expected: "[NORMAL]".to_string(),
                actual: format_stack(&self.contexts),
            });
        }
        if self.flags.brace != 0 {
            violations.push(Violation {
                category: ViolationCategory::UnbalancedBrace,
                message: "brace depth nonzero after tokenization".to_string(),
                expected: "0".to_string(),
                actual: self.flags.brace.to_string(),
            });
        }
        if self.flags.paren != 0 {
            violations.push(Violation {
                category: ViolationCategory::UnbalancedParen,
                message: "paren depth nonzero after tokenization".to_string(),
                expected: "0".to_string(),
                actual: self.flags.paren.to_string(),
            });
        }
        if self.flags.bracket != 0 {
            violations.push(Violation {
                category: ViolationCategory::UnbalancedBracket,
                message: "bracket depth nonzero after tokenization".to_string(),
                expected: "0".to_string(),
                actual: self.flags.bracket.to_string(),
            });
        }

        CleanExitResult::from_violations(violations)
    }

    /// The context stack as of the last run (top is last).
    pub fn contexts(&self) -> &[LexerContext] {
        &self.contexts
    }

    /// The depth counters as of the last run.
    pub fn flags(&self) -> DepthCounters {
        self.flags
    }

    fn reset(&mut self) {
        self.cursor = Cursor::new(self.cursor.source());
        self.contexts = vec![LexerContext::Normal];
        self.flags = DepthCounters::default();
        self.violations.clear();
        self.pending_section = None;
        self.pending_type_literal = None;
        self.token_start = 0;
        self.token_start_line = 1;
        self.token_start_column = 1;
        self.finished = false;
    }

    /// Scans the next token. Trivia is skipped first; the dispatch is on the
    /// first significant character.
    fn next_token(&mut self) -> Token {
        self.skip_trivia();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        match self.cursor.current_char() {
            '{' => {
                self.cursor.advance();
                self.make_token(TokenKind::LBrace)
            }
            '}' => {
                self.cursor.advance();
                self.make_token(TokenKind::RBrace)
            }
            '(' => {
                self.cursor.advance();
                self.make_token(TokenKind::LParen)
            }
            ')' => {
                self.cursor.advance();
                self.make_token(TokenKind::RParen)
            }
            '[' => {
                self.cursor.advance();
                self.make_token(TokenKind::LBracket)
            }
            ']' => {
                self.cursor.advance();
                self.make_token(TokenKind::RBracket)
            }
            ',' => {
                self.cursor.advance();
                self.make_token(TokenKind::Comma)
            }
            ';' => {
                self.cursor.advance();
                self.make_token(TokenKind::Semicolon)
            }
            '@' => {
                self.cursor.advance();
                self.make_token(TokenKind::At)
            }
            ':' => self.lex_colon(),
            '.' => self.lex_dot(),
            '+' => self.lex_compound(TokenKind::Plus, TokenKind::PlusAssign),
            '-' => self.lex_compound(TokenKind::Minus, TokenKind::MinusAssign),
            '*' => self.lex_compound(TokenKind::Star, TokenKind::StarAssign),
            '/' => self.lex_compound(TokenKind::Slash, TokenKind::SlashAssign),
            '=' => {
                self.cursor.advance();
                self.make_token(TokenKind::Eq)
            }
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '\'' => self.lex_string(),
            '"' => self.lex_quoted(),
            '#' => self.lex_preproc(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => self.lex_identifier(),
            _ => {
                self.cursor.advance();
                self.make_token(TokenKind::Unknown)
            }
        }
    }

    /// Builds a token spanning from `token_start` to the cursor.
    pub(crate) fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            value: self.cursor.slice_from(self.token_start).to_string(),
            line: self.token_start_line,
            column: self.token_start_column,
            start: self.token_start,
            end: self.cursor.position(),
        }
    }

    /// The current top of the context stack.
    pub(crate) fn top_context(&self) -> LexerContext {
        *self.contexts.last().unwrap_or(&LexerContext::Normal)
    }

    /// True while a section keyword is waiting for its `{`.
    pub(crate) fn section_pending(&self) -> bool {
        self.pending_section.is_some()
    }

    /// The type-literal context for the `"` being scanned, if any.
    pub(crate) fn take_type_literal(&mut self) -> Option<LexerContext> {
        self.pending_type_literal.take()
    }

    // -------------------------------------------------------------------
    // Context transitions
    // -------------------------------------------------------------------

    /// Applies the context-stack and counter transitions the emitted token
    /// triggers. Pure function of the token kind and current state.
    fn apply_transitions(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Keyword(Keyword::Object) => {
                if self.top_context() == LexerContext::Normal {
                    self.push_context(LexerContext::ObjectHeader);
                }
            }
            TokenKind::Keyword(Keyword::DotNet) => {
                self.pending_type_literal = Some(LexerContext::DotNetTypeLiteral);
                return;
            }
            TokenKind::Keyword(Keyword::Automation) => {
                self.pending_type_literal = Some(LexerContext::AutomationTypeLiteral);
                return;
            }
            TokenKind::Keyword(kw) if kw.is_section() => {
                // A section keyword opens a section only when a `{` follows;
                // otherwise it is an ordinary lexeme (`Code[20]`).
                let in_body = matches!(
                    self.top_context(),
                    LexerContext::PropertyBlock | LexerContext::Normal
                );
                if in_body && self.is_followed_by_left_brace() {
                    self.pending_section = Some(section_context(kw));
                }
                self.pending_type_literal = None;
                return;
            }
            TokenKind::LBrace => {
                self.flags.brace += 1;
                self.trace_flag("braceDepth", self.flags.brace);
                let pushed = if let Some(section) = self.pending_section.take() {
                    section
                } else if self.top_context() == LexerContext::ObjectHeader {
                    LexerContext::PropertyBlock
                } else {
                    // Structural row inside a block (field/key/control rows
                    // nest their section's context).
                    self.top_context()
                };
                self.push_context(pushed);
                if pushed == LexerContext::RdlData {
                    self.skip_rdldata_region();
                }
            }
            TokenKind::RBrace => {
                self.flags.brace -= 1;
                self.trace_flag("braceDepth", self.flags.brace);
                self.pop_context();
                // The object header context closes together with the body.
                if self.top_context() == LexerContext::ObjectHeader {
                    self.pop_context();
                }
            }
            TokenKind::LParen => {
                self.flags.paren += 1;
                self.trace_flag("parenDepth", self.flags.paren);
            }
            TokenKind::RParen => {
                self.flags.paren -= 1;
                self.trace_flag("parenDepth", self.flags.paren);
            }
            TokenKind::LBracket => {
                self.flags.bracket += 1;
                self.trace_flag("bracketDepth", self.flags.bracket);
            }
            TokenKind::RBracket => {
                self.flags.bracket -= 1;
                self.trace_flag("bracketDepth", self.flags.bracket);
            }
            _ => {}
        }
        self.pending_type_literal = None;
    }

    pub(crate) fn push_context(&mut self, context: LexerContext) {
        self.contexts.push(context);
        self.trace_here(TraceEventKind::Push { context });
    }

    pub(crate) fn pop_context(&mut self) {
        // Never pop the base NORMAL context; the imbalance is reported by
        // the brace counter instead.
        if self.contexts.len() > 1 {
            if let Some(context) = self.contexts.pop() {
                self.trace_here(TraceEventKind::Pop { context });
            }
        }
    }

    /// One-token lookahead: is the next significant character a `{`?
    ///
    /// Skips whitespace and `//` comments only; a `{` after a section
    /// keyword is the section opener, never a comment.
    pub(crate) fn is_followed_by_left_brace(&self) -> bool {
        let rest = self.cursor.remaining().as_bytes();
        let mut i = 0;
        while i < rest.len() {
            match rest[i] {
                b' ' | b'\t' | b'\r' | b'\n' => i += 1,
                b'/' if rest.get(i + 1) == Some(&b'/') => {
                    while i < rest.len() && rest[i] != b'\n' {
                        i += 1;
                    }
                }
                b'{' => return true,
                _ => return false,
            }
        }
        false
    }

    /// Consumes an RDLDATA section's content without emitting tokens.
    ///
    /// The region ends just before the `}` that closes the section; interior
    /// braces are tracked so XML payloads with balanced `{}` pass through.
    /// RDLDATA markers in report exports are asymmetric often enough that the
    /// content can swallow its own closers and run to the end of input. That
    /// is the `rdldata-underflow` condition: it is recorded once under that
    /// category and the remaining contexts are unwound synthetically, so a
    /// consumer that opts into `allow_rdldata_underflow` sees no cascade of
    /// stack and brace mismatches behind it.
    fn skip_rdldata_region(&mut self) {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();
        let mut depth: u32 = 0;

        loop {
            if self.cursor.is_at_end() {
                self.violations.push(Violation {
                    category: ViolationCategory::RdldataUnderflow,
                    message: "RDLDATA section not closed before end of input".to_string(),
                    expected: "closing } for RDLDATA".to_string(),
                    actual: "end of input".to_string(),
                });
                while self.contexts.len() > 1 {
                    self.pop_context();
                }
                self.flags.brace = 0;
                self.trace_flag("braceDepth", self.flags.brace);
                break;
            }
            match self.cursor.current_char() {
                '{' => {
                    depth += 1;
                    self.cursor.advance();
                }
                '}' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.cursor.advance();
                }
                _ => self.cursor.advance(),
            }
        }

        let bytes = self.cursor.position() - start;
        self.trace_event(
            line,
            column,
            start,
            TraceEventKind::Skip {
                what: "rdldata content",
                bytes,
            },
        );
    }

    // -------------------------------------------------------------------
    // Violations and tracing
    // -------------------------------------------------------------------

    /// Records an unterminated-literal violation.
    pub(crate) fn report_unterminated(&mut self, what: &str, actual: &str) {
        self.violations.push(Violation {
            category: ViolationCategory::UnterminatedLiteral,
            message: format!("unterminated {what}"),
            expected: format!("closing delimiter for {what}"),
            actual: actual.to_string(),
        });
    }

    pub(crate) fn trace_event(
        &mut self,
        line: u32,
        column: u32,
        offset: usize,
        kind: TraceEventKind,
    ) {
        if let Some(sink) = self.trace.as_mut() {
            sink.record(TraceEvent {
                line,
                column,
                offset,
                kind,
            });
        }
    }

    /// Trace an event at the current cursor position.
    pub(crate) fn trace_here(&mut self, kind: TraceEventKind) {
        let line = self.cursor.line();
        let column = self.cursor.column();
        let offset = self.cursor.position();
        self.trace_event(line, column, offset, kind);
    }

    fn trace_flag(&mut self, name: &'static str, value: i64) {
        self.trace_here(TraceEventKind::Flag { name, value });
    }
}

/// Maps a section keyword to the context its block runs in.
fn section_context(kw: Keyword) -> LexerContext {
    match kw {
        Keyword::Fields => LexerContext::FieldsBlock,
        Keyword::Keys => LexerContext::KeysBlock,
        Keyword::Controls => LexerContext::ControlsBlock,
        Keyword::Code => LexerContext::CodeSection,
        Keyword::RdlData => LexerContext::RdlData,
        // PROPERTIES and OBJECT-PROPERTIES share the property context.
        _ => LexerContext::PropertyBlock,
    }
}

/// Identifier start: `[A-Za-z_]`.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Identifier continuation: `[A-Za-z0-9_]`.
pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
