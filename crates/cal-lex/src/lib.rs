//! cal-lex - Lexical analyzer for C/AL object text.
//!
//! C/AL is not a regular language at the lexical level: the same byte
//! sequence means different things depending on the enclosing section.
//! `CODE {` opens a code section while `Code[20]` is a datatype; a `{ ... }`
//! region is a comment inside procedure bodies but a structural row inside
//! `FIELDS`. The lexer therefore maintains a context stack and a set of
//! depth counters while scanning, and can report afterwards whether every
//! context it opened was closed (the "clean exit" check).
//!
//! Module layout:
//! - `cursor` - Byte cursor with line/column tracking
//! - `token` - Token and token-kind definitions
//! - `context` - Lexer contexts and depth counters
//! - `lexer` - The scanner itself, split into focused submodules
//! - `clean_exit` - Post-tokenization invariant checks
//! - `position` - Cross-check between emitted tokens and the source
//! - `trace` - Observer hooks for auditing every lexer decision
//!
//! The lexer never fails: malformed input produces `Unknown` tokens and
//! clean-exit violations, and the token stream is always terminated by an
//! `Eof` sentinel.

pub mod clean_exit;
pub mod context;
pub mod cursor;
pub mod lexer;
pub mod position;
pub mod token;
pub mod trace;

mod edge_cases;

pub use clean_exit::{CleanExitOptions, CleanExitResult, Violation, ViolationCategory};
pub use context::LexerContext;
pub use lexer::Lexer;
pub use position::{validate_token_positions, PositionValidation};
pub use token::{Token, TokenKind};
pub use trace::{CollectingSink, TraceEvent, TraceEventKind, TraceSink};
