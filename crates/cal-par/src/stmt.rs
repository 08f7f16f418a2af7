//! Statement parsing.
//!
//! The subtle parts all concern what a statement does NOT consume:
//!
//! - A semicolon directly after an `IF`'s then-branch ends that `IF`'s claim
//!   on a following `ELSE`; the `ELSE` is handed to the enclosing `IF` or
//!   `CASE`. Without the semicolon, a dangling `ELSE` binds to the
//!   innermost `IF`.
//! - An empty control-flow body never consumes a bare `END`; that `END`
//!   belongs to the enclosing `BEGIN ... END`.
//! - `REPEAT` without `UNTIL` reports its error at the `REPEAT` keyword
//!   itself, and accepts a closing `END` as the recovery terminator, since
//!   that is what the malformed sources actually contain.

use cal_lex::TokenKind;
use cal_util::Keyword;

use crate::ast::{
    AssignOp, BinaryOp, CaseBranch, Expression, ExpressionKind, Statement, StatementKind,
};
use crate::Parser;

/// AL-only spellings rejected in C/AL statement positions, by message kind.
const AL_ONLY_KEYWORDS: [&str; 2] = ["interface", "enum"];
const AL_ONLY_ACCESS_MODIFIERS: [&str; 2] = ["internal", "protected"];

impl Parser {
    /// Parses one statement. List separators (`;`) are the caller's job.
    pub(crate) fn parse_statement(&mut self) -> Statement {
        let start = self.pos;

        match self.peek().kind {
            TokenKind::Keyword(Keyword::Begin) => self.parse_block(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::With) => self.parse_with(),
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Repeat) => self.parse_repeat(),
            TokenKind::Keyword(Keyword::Exit) => self.parse_exit(),
            TokenKind::Keyword(Keyword::End) | TokenKind::Keyword(Keyword::Until) => {
                self.empty_statement()
            }
            TokenKind::Keyword(Keyword::Else) => {
                // An ELSE with no IF or CASE left to claim it.
                self.error_at_current("Expression cannot start with ELSE".to_string());
                self.advance();
                self.spanned_statement(start, StatementKind::Empty)
            }
            TokenKind::Semicolon | TokenKind::RBrace => self.empty_statement(),
            TokenKind::PreprocMarker => {
                let message = format!(
                    "AL-only preprocessor directive {} is not valid in C/AL",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                self.spanned_statement(start, StatementKind::Empty)
            }
            TokenKind::Ident if AL_ONLY_KEYWORDS.contains(&self.peek().value.as_str()) => {
                let message = format!(
                    "AL-only keyword {} is not valid in C/AL",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                self.spanned_statement(start, StatementKind::Empty)
            }
            TokenKind::Ident
                if AL_ONLY_ACCESS_MODIFIERS.contains(&self.peek().value.as_str()) =>
            {
                let message = format!(
                    "AL-only access modifier {} is not valid in C/AL",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                self.spanned_statement(start, StatementKind::Empty)
            }
            TokenKind::Keyword(kw)
                if !kw.usable_as_name()
                    && !matches!(kw, Keyword::Not | Keyword::True | Keyword::False) =>
            {
                let message = format!(
                    "Unexpected keyword {} in statement position",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                self.spanned_statement(start, StatementKind::Empty)
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Body of `IF`/`WHILE`/`FOR`/`WITH`: a single statement, possibly
    /// empty. An empty body never consumes the token that ends the
    /// enclosing construct.
    pub(crate) fn parse_controlled_statement(&mut self) -> Statement {
        if self.at_eof()
            || self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RBrace)
            || matches!(
                self.peek().keyword(),
                Some(Keyword::End | Keyword::Else | Keyword::Until)
            )
        {
            return self.empty_statement();
        }
        self.parse_statement()
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let start = self.pos;
        let target = self.parse_expression();

        let operator = match self.peek().kind {
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::PlusAssign => Some(AssignOp::AddAssign),
            TokenKind::MinusAssign => Some(AssignOp::SubAssign),
            TokenKind::StarAssign => Some(AssignOp::MulAssign),
            TokenKind::SlashAssign => Some(AssignOp::DivAssign),
            _ => None,
        };

        match operator {
            Some(operator) => {
                self.advance();
                let value = self.parse_expression();
                self.spanned_statement(
                    start,
                    StatementKind::Assignment {
                        target,
                        operator,
                        value,
                    },
                )
            }
            None => self.spanned_statement(start, StatementKind::Call(target)),
        }
    }

    /// `BEGIN ... END`.
    pub(crate) fn parse_block(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // BEGIN

        let mut statements = Vec::new();
        loop {
            if self.match_keyword(Keyword::End) {
                break;
            }
            if self.at_eof() || self.check(TokenKind::RBrace) {
                self.error_at_previous("Expected END to close BEGIN block".to_string());
                break;
            }

            let before = self.pos;
            let statement = self.parse_statement();
            let progressed = self.pos > before;
            if progressed || !matches!(statement.kind, StatementKind::Empty) {
                statements.push(statement);
            }

            if self.match_kind(TokenKind::Semicolon) {
                continue;
            }
            if self.check_keyword(Keyword::End) || self.check_keyword(Keyword::Else) {
                // END closes the block next round; an orphaned ELSE gets its
                // own error when parsed.
                continue;
            }
            if !progressed {
                let message = format!(
                    "Unexpected token {} in BEGIN block",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                continue;
            }
            self.error_at_previous("Expected ; after statement".to_string());
        }

        self.spanned_statement(start, StatementKind::Block(statements))
    }

    /// `IF cond THEN stmt [ELSE stmt]`, with the semicolon rule.
    fn parse_if(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // IF
        let condition = self.parse_expression();
        self.consume_expected_keyword(Keyword::Then, "Expected THEN after IF condition");

        let then_branch = Box::new(self.parse_controlled_statement());

        let mut else_branch = None;
        if self.match_keyword(Keyword::Else) {
            else_branch = Some(Box::new(self.parse_controlled_statement()));
        } else if self.check(TokenKind::Semicolon)
            && self.peek_ahead(1).keyword() == Some(Keyword::Else)
        {
            // The semicolon ends this IF's claim on the ELSE; consume it and
            // leave the ELSE for the enclosing IF or CASE.
            self.advance();
        }

        self.spanned_statement(
            start,
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
        )
    }

    fn parse_while(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // WHILE
        let condition = self.parse_expression();
        self.consume_expected_keyword(Keyword::Do, "Expected DO after WHILE condition");
        let body = Box::new(self.parse_controlled_statement());
        self.spanned_statement(start, StatementKind::While { condition, body })
    }

    fn parse_for(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // FOR
        let variable = self.parse_expression();
        self.consume_expected(TokenKind::Assign, "Expected := after FOR variable");
        let initial = self.parse_expression();

        let downto = if self.match_keyword(Keyword::To) {
            false
        } else if self.match_keyword(Keyword::DownTo) {
            true
        } else {
            self.error_at_previous("Expected TO or DOWNTO in FOR statement".to_string());
            false
        };

        let limit = self.parse_expression();
        self.consume_expected_keyword(Keyword::Do, "Expected DO after FOR range");
        let body = Box::new(self.parse_controlled_statement());
        self.spanned_statement(
            start,
            StatementKind::For {
                variable,
                initial,
                limit,
                downto,
                body,
            },
        )
    }

    fn parse_with(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // WITH
        let subject = self.parse_expression();
        self.consume_expected_keyword(Keyword::Do, "Expected DO after WITH expression");
        let body = Box::new(self.parse_controlled_statement());
        self.spanned_statement(start, StatementKind::With { subject, body })
    }

    /// `CASE expr OF { branch } [ELSE stmts] END`.
    fn parse_case(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // CASE
        let scrutinee = self.parse_expression();
        self.consume_expected_keyword(Keyword::Of, "Expected OF after CASE expression");

        let mut branches = Vec::new();
        while !(self.at_eof()
            || self.check(TokenKind::RBrace)
            || matches!(self.peek().keyword(), Some(Keyword::End | Keyword::Else)))
        {
            let before = self.pos;
            branches.push(self.parse_case_branch());
            if self.pos == before {
                let message = format!(
                    "Unexpected token {} in CASE statement",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
            }
        }

        let mut else_branch = Vec::new();
        if self.match_keyword(Keyword::Else) {
            self.parse_statement_list_until_end(&mut else_branch);
        }

        self.consume_expected_keyword(Keyword::End, "Expected END to close CASE");
        self.spanned_statement(
            start,
            StatementKind::Case {
                scrutinee,
                branches,
                else_branch,
            },
        )
    }

    /// One `values : statements` branch.
    ///
    /// A missing `:` leaves a partial branch (values populated, statements
    /// empty) and skips forward to the next plausible branch label, an
    /// identifier or literal immediately followed by `:`. That predicate
    /// keeps identifiers inside argument lists (followed by `,` or `)`)
    /// from being mistaken for labels.
    fn parse_case_branch(&mut self) -> CaseBranch {
        let start = self.pos;
        let mut values = vec![self.parse_case_value()];
        while self.match_kind(TokenKind::Comma) {
            values.push(self.parse_case_value());
        }

        let mut statements = Vec::new();
        if self.match_kind(TokenKind::Colon) {
            loop {
                if self.at_eof()
                    || self.check(TokenKind::RBrace)
                    || matches!(self.peek().keyword(), Some(Keyword::End | Keyword::Else))
                    || self.is_branch_boundary_ahead()
                {
                    break;
                }

                let before = self.pos;
                let statement = self.parse_statement();
                let progressed = self.pos > before;
                if progressed || !matches!(statement.kind, StatementKind::Empty) {
                    statements.push(statement);
                }

                if self.match_kind(TokenKind::Semicolon) {
                    continue;
                }
                if !progressed {
                    let message = format!(
                        "Unexpected token {} in CASE branch",
                        self.describe_current()
                    );
                    self.error_at_current(message);
                    self.advance();
                }
            }
        } else {
            self.error_at_previous("Expected : after CASE branch value".to_string());
            while !(self.at_eof()
                || self.check(TokenKind::RBrace)
                || matches!(self.peek().keyword(), Some(Keyword::End | Keyword::Else))
                || self.is_case_label_ahead())
            {
                self.advance();
            }
        }

        CaseBranch {
            values,
            statements,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }

    /// A branch value; `a..b` ranges are permitted here.
    fn parse_case_value(&mut self) -> Expression {
        let lhs = self.parse_expression();
        if self.match_kind(TokenKind::DotDot) {
            let rhs = self.parse_expression();
            let start = lhs.start_token;
            let end = rhs.end_token;
            return Expression {
                kind: ExpressionKind::Binary {
                    op: BinaryOp::Range,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                start_token: start,
                end_token: end,
            };
        }
        lhs
    }

    /// An identifier or literal immediately followed by `:`, the start of
    /// a real branch label. This is the recovery predicate: it deliberately
    /// excludes identifiers followed by `,` or `)` so call arguments are
    /// not mistaken for labels.
    fn is_case_label_ahead(&self) -> bool {
        self.is_label_value_token() && self.peek_ahead(1).kind == TokenKind::Colon
    }

    /// Between branch statements the boundary test is broader: a label may
    /// also continue with `..` (range) or `,` (value list) before its `:`.
    /// No valid statement starts with a value followed by either, so there
    /// is no ambiguity here.
    fn is_branch_boundary_ahead(&self) -> bool {
        self.is_label_value_token()
            && matches!(
                self.peek_ahead(1).kind,
                TokenKind::Colon | TokenKind::DotDot | TokenKind::Comma
            )
    }

    fn is_label_value_token(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Integer
                | TokenKind::Decimal
                | TokenKind::StringLit
                | TokenKind::Ident
                | TokenKind::QuotedIdent
        )
    }

    /// `REPEAT stmts UNTIL expr`, with the error pinned to the `REPEAT`
    /// keyword when the `UNTIL` is missing.
    fn parse_repeat(&mut self) -> Statement {
        let repeat_token = self.pos;
        self.advance(); // REPEAT

        let mut body = Vec::new();
        let mut condition = None;
        loop {
            if self.match_keyword(Keyword::Until) {
                condition = Some(self.parse_expression());
                break;
            }
            if self.check_keyword(Keyword::End) {
                self.error_at_token(
                    repeat_token,
                    "Expected UNTIL to close REPEAT".to_string(),
                );
                // Sources that hit this actually wrote `REPEAT ... END;`, so
                // take the END as the terminator and keep going.
                self.advance();
                break;
            }
            if self.at_eof()
                || self.check(TokenKind::RBrace)
                || self.check_keyword(Keyword::Else)
            {
                self.error_at_token(
                    repeat_token,
                    "Expected UNTIL to close REPEAT".to_string(),
                );
                break;
            }

            let before = self.pos;
            let statement = self.parse_statement();
            let progressed = self.pos > before;
            if progressed || !matches!(statement.kind, StatementKind::Empty) {
                body.push(statement);
            }

            if self.match_kind(TokenKind::Semicolon) {
                continue;
            }
            if self.check_keyword(Keyword::Until) || self.check_keyword(Keyword::End) {
                continue;
            }
            if !progressed {
                let message = format!(
                    "Unexpected token {} in REPEAT body",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                continue;
            }
            self.error_at_previous("Expected ; after statement".to_string());
        }

        self.spanned_statement(repeat_token, StatementKind::Repeat { body, condition })
    }

    /// `EXIT` or `EXIT(expr)`.
    fn parse_exit(&mut self) -> Statement {
        let start = self.pos;
        self.advance(); // EXIT
        let mut argument = None;
        if self.match_kind(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                argument = Some(self.parse_expression());
            }
            self.consume_expected(TokenKind::RParen, "Expected ) after EXIT argument");
        }
        self.spanned_statement(start, StatementKind::Exit(argument))
    }

    /// Statements between `ELSE` (of a CASE) and `END`.
    fn parse_statement_list_until_end(&mut self, out: &mut Vec<Statement>) {
        loop {
            if self.at_eof()
                || self.check(TokenKind::RBrace)
                || self.check_keyword(Keyword::End)
            {
                break;
            }

            let before = self.pos;
            let statement = self.parse_statement();
            let progressed = self.pos > before;
            if progressed || !matches!(statement.kind, StatementKind::Empty) {
                out.push(statement);
            }

            if self.match_kind(TokenKind::Semicolon) {
                continue;
            }
            if self.check_keyword(Keyword::End) {
                continue;
            }
            if !progressed {
                let message = format!(
                    "Unexpected token {} in CASE ELSE branch",
                    self.describe_current()
                );
                self.error_at_current(message);
                self.advance();
                continue;
            }
            self.error_at_previous("Expected ; after statement".to_string());
        }
    }

    pub(crate) fn empty_statement(&self) -> Statement {
        Statement {
            kind: StatementKind::Empty,
            start_token: self.pos,
            end_token: self.pos,
        }
    }

    pub(crate) fn spanned_statement(&self, start: usize, kind: StatementKind) -> Statement {
        Statement {
            kind,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }
}
