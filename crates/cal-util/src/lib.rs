//! cal-util - Foundation types for the C/AL toolchain.
//!
//! This crate provides the pieces shared by every stage of the pipeline:
//! - `span` - Source location tracking
//! - `keywords` - The fixed, case-insensitive C/AL keyword table
//! - `sanitize` - Redaction of source content in outward-facing messages
//! - `stats` - Percentile and ETA math for the corpus driver
//!
//! Everything in this crate is read-only after initialization; the keyword
//! table is a process-wide constant and all functions are pure, so instances
//! of the lexer and parser can live on separate threads without coordination.

pub mod keywords;
pub mod sanitize;
pub mod span;
pub mod stats;

pub use keywords::{keyword_from_str, Keyword};
pub use sanitize::{escape_markdown, is_safe_lexeme, sanitize_value, sanitize_value_at};
pub use span::Span;
pub use stats::{calculate_eta, percentile, StatsError};
