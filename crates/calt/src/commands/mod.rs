//! Subcommand implementations.
//!
//! - `corpus` - File discovery and per-file validation runs
//! - `report` - Markdown health report rendering
//! - `baseline` - The CI failure-count ratchet
//! - `trace` - Lexer decision trace tool
//! - `version_check` - package.json vs baseline version drift

pub mod baseline;
pub mod corpus;
pub mod report;
pub mod trace;
pub mod version_check;
