//! Expression parsing with Pratt-style precedence.
//!
//! Precedence from loosest to tightest: `OR`/`XOR`, `AND`, relational,
//! additive, multiplicative (`* / MOD DIV`), unary `+ - NOT`, then postfix
//! (call, index, member, `::`). Assignment is not an expression in C/AL;
//! it is handled at the statement level.

use cal_lex::TokenKind;
use cal_util::Keyword;

use crate::ast::{BinaryOp, Expression, ExpressionKind, Literal, UnaryOp};
use crate::Parser;

/// Binding power levels. Left-associative operators parse their right side
/// with `level + 1`.
pub(crate) mod bp {
    pub const MIN: u8 = 0;
    /// `OR`, `XOR`
    pub const OR_XOR: u8 = 2;
    /// `AND`
    pub const AND: u8 = 4;
    /// `= <> < > <= >=`
    pub const COMPARISON: u8 = 6;
    /// `+ -`
    pub const ADDITIVE: u8 = 8;
    /// `* / MOD DIV`
    pub const MULTIPLICATIVE: u8 = 10;
    /// Prefix `+ - NOT`
    pub const UNARY: u8 = 12;
}

impl Parser {
    /// Main expression entry point.
    pub(crate) fn parse_expression(&mut self) -> Expression {
        self.parse_expression_bp(bp::MIN)
    }

    /// Pratt core: parse a prefix expression, then fold in binary operators
    /// whose binding power is at least `min_bp`.
    pub(crate) fn parse_expression_bp(&mut self, min_bp: u8) -> Expression {
        let mut lhs = self.parse_prefix();

        loop {
            let Some((op, lbp)) = self.peek_binary_op() else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expression_bp(lbp + 1);
            let start = lhs.start_token;
            let end = rhs.end_token;
            lhs = Expression {
                kind: ExpressionKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                start_token: start,
                end_token: end,
            };
        }

        lhs
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek().kind {
            TokenKind::Keyword(Keyword::Or) => (BinaryOp::Or, bp::OR_XOR),
            TokenKind::Keyword(Keyword::Xor) => (BinaryOp::Xor, bp::OR_XOR),
            TokenKind::Keyword(Keyword::And) => (BinaryOp::And, bp::AND),
            TokenKind::Eq => (BinaryOp::Eq, bp::COMPARISON),
            TokenKind::Ne => (BinaryOp::Ne, bp::COMPARISON),
            TokenKind::Lt => (BinaryOp::Lt, bp::COMPARISON),
            TokenKind::Gt => (BinaryOp::Gt, bp::COMPARISON),
            TokenKind::Le => (BinaryOp::Le, bp::COMPARISON),
            TokenKind::Ge => (BinaryOp::Ge, bp::COMPARISON),
            TokenKind::Plus => (BinaryOp::Add, bp::ADDITIVE),
            TokenKind::Minus => (BinaryOp::Sub, bp::ADDITIVE),
            TokenKind::Star => (BinaryOp::Mul, bp::MULTIPLICATIVE),
            TokenKind::Slash => (BinaryOp::Div, bp::MULTIPLICATIVE),
            TokenKind::Keyword(Keyword::Mod) => (BinaryOp::Mod, bp::MULTIPLICATIVE),
            TokenKind::Keyword(Keyword::Div) => (BinaryOp::IntDiv, bp::MULTIPLICATIVE),
            _ => return None,
        };
        Some(op)
    }

    fn parse_prefix(&mut self) -> Expression {
        let start = self.pos;
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Plus => self.parse_unary(UnaryOp::Plus),
            TokenKind::Minus => self.parse_unary(UnaryOp::Minus),
            TokenKind::Keyword(Keyword::Not) => self.parse_unary(UnaryOp::Not),
            TokenKind::Integer => {
                self.advance();
                let value = match token.value.parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => {
                        self.error_at_token(
                            start,
                            "Invalid integer literal: value out of range".to_string(),
                        );
                        0
                    }
                };
                let literal = self.spanned_expr(start, ExpressionKind::Literal(Literal::Integer(value)));
                self.parse_postfix(literal)
            }
            TokenKind::Decimal => {
                self.advance();
                let value = token.value.parse::<f64>().unwrap_or_default();
                let literal = self.spanned_expr(start, ExpressionKind::Literal(Literal::Decimal(value)));
                self.parse_postfix(literal)
            }
            TokenKind::StringLit => {
                self.advance();
                let text = unescape_string(&token.value);
                self.spanned_expr(start, ExpressionKind::Literal(Literal::Str(text)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                self.spanned_expr(start, ExpressionKind::Literal(Literal::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                self.spanned_expr(start, ExpressionKind::Literal(Literal::Bool(false)))
            }
            TokenKind::Ident | TokenKind::QuotedIdent => {
                self.advance();
                let name = Self::name_text(&token);
                let ident = self.spanned_expr(start, ExpressionKind::Identifier(name));
                self.parse_postfix(ident)
            }
            TokenKind::Keyword(kw) if kw.usable_as_name() => {
                // `Page.RUNMODAL(...)`, `Report.RUN(...)`: object-kind
                // keywords act as identifiers in expressions.
                self.advance();
                let ident = self.spanned_expr(start, ExpressionKind::Identifier(token.value));
                self.parse_postfix(ident)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.consume_expected(TokenKind::RParen, "Expected ) after parenthesized expression");
                let paren = self.spanned_expr(start, ExpressionKind::Parenthesized(Box::new(inner)));
                self.parse_postfix(paren)
            }
            _ => {
                let message = format!(
                    "Unexpected token {} in expression",
                    Self::describe(&token)
                );
                self.error_at_current(message);
                if !self.is_expression_terminator() {
                    self.advance();
                }
                self.spanned_expr(start, ExpressionKind::Identifier(String::new()))
            }
        }
    }

    fn parse_unary(&mut self, op: UnaryOp) -> Expression {
        let start = self.pos;
        self.advance();
        let operand = self.parse_expression_bp(bp::UNARY);
        let end = operand.end_token;
        Expression {
            kind: ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start_token: start,
            end_token: end,
        }
    }

    fn parse_postfix(&mut self, mut expr: Expression) -> Expression {
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    match self.parse_member_name() {
                        Some(name) => {
                            let start = expr.start_token;
                            expr = Expression {
                                kind: ExpressionKind::Member {
                                    base: Box::new(expr),
                                    name,
                                },
                                start_token: start,
                                end_token: self.pos.saturating_sub(1),
                            };
                        }
                        None => {
                            self.error_at_previous("Expected member name after .".to_string());
                            break;
                        }
                    }
                }
                TokenKind::ColonColon => {
                    self.advance();
                    match self.parse_member_name() {
                        Some(name) => {
                            let start = expr.start_token;
                            expr = Expression {
                                kind: ExpressionKind::Namespace {
                                    base: Box::new(expr),
                                    name,
                                },
                                start_token: start,
                                end_token: self.pos.saturating_sub(1),
                            };
                        }
                        None => {
                            self.error_at_previous("Expected name after ::".to_string());
                            break;
                        }
                    }
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression());
                            if !self.match_kind(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume_expected(TokenKind::RParen, "Expected ) after arguments");
                    let start = expr.start_token;
                    expr = Expression {
                        kind: ExpressionKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        start_token: start,
                        end_token: self.pos.saturating_sub(1),
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let mut indices = Vec::new();
                    if !self.check(TokenKind::RBracket) {
                        loop {
                            indices.push(self.parse_expression());
                            if !self.match_kind(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume_expected(TokenKind::RBracket, "Expected ] after index");
                    let start = expr.start_token;
                    expr = Expression {
                        kind: ExpressionKind::Index {
                            base: Box::new(expr),
                            indices,
                        },
                        start_token: start,
                        end_token: self.pos.saturating_sub(1),
                    };
                }
                _ => break,
            }
        }
        expr
    }

    /// A name after `.` or `::`: identifier, quoted identifier or any
    /// keyword spelling (`Rec.Code`, `OBJECTTYPE::Table`).
    fn parse_member_name(&mut self) -> Option<String> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident | TokenKind::QuotedIdent | TokenKind::Keyword(_) => {
                self.advance();
                Some(Self::name_text(&token))
            }
            _ => None,
        }
    }

    /// Tokens that end an expression; a bad prefix at one of these is not
    /// consumed so the enclosing construct can close.
    fn is_expression_terminator(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Eof
        ) || matches!(
            self.peek().keyword(),
            Some(
                Keyword::End
                    | Keyword::Else
                    | Keyword::Then
                    | Keyword::Do
                    | Keyword::Of
                    | Keyword::Until
                    | Keyword::To
                    | Keyword::DownTo
            )
        )
    }

    fn spanned_expr(&self, start: usize, kind: ExpressionKind) -> Expression {
        Expression {
            kind,
            start_token: start,
            end_token: self.pos.saturating_sub(1).max(start),
        }
    }
}

/// Strip the bounding quotes of a string literal and unescape doubled
/// quotes.
pub(crate) fn unescape_string(value: &str) -> String {
    let interior = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    interior.replace("''", "'")
}
