//! Lexer trace tool.
//!
//! Prints one `[L:C] EVENT: details` line per lexer decision, preceded by a
//! confidentiality banner, trace output reproduces token values, which in
//! customer objects are proprietary. With `--sanitize`, values outside the
//! keyword allow-list and simple identifiers are truncated to
//! `first3…last3` when longer than six characters.

use std::fs;
use std::path::Path;

use cal_lex::{CollectingSink, Lexer, TraceEvent, TraceEventKind};
use cal_util::keyword_from_str;

use crate::error::Result;

/// Run the trace tool over one file, writing to stdout.
pub fn run_trace(file: &Path, sanitize: bool) -> Result<()> {
    let bytes = fs::read(file)?;
    let source = String::from_utf8_lossy(&bytes);

    let sink = CollectingSink::new();
    let mut lexer = Lexer::with_trace(&source, Box::new(sink.clone()));
    lexer.tokenize();

    print_banner(sanitize);
    for event in sink.events() {
        println!("{}", format_trace_line(&event, sanitize));
    }
    Ok(())
}

fn print_banner(sanitize: bool) {
    println!("=== C/AL LEXER TRACE ===");
    println!("CONFIDENTIAL: trace output may reproduce proprietary source content.");
    if sanitize {
        println!("Sanitization is ON: non-keyword values are truncated.");
    } else {
        println!("Run with --sanitize before sharing this output.");
    }
    println!();
}

/// Format one trace event; only token events carry values to redact.
pub fn format_trace_line(event: &TraceEvent, sanitize: bool) -> String {
    match &event.kind {
        TraceEventKind::Token { kind, value } if sanitize => format!(
            "[{}:{}] TOKEN: {} '{}'",
            event.line,
            event.column,
            kind,
            redact_trace_value(value)
        ),
        _ => event.to_string(),
    }
}

/// Keyword-table entries and simple identifiers pass through; any other
/// value longer than six characters becomes `first3…last3`.
pub fn redact_trace_value(value: &str) -> String {
    if keyword_from_str(value).is_some() || is_simple_identifier(value) {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return value.to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}…{tail}")
}

fn is_simple_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_and_identifiers_pass_through() {
        assert_eq!(redact_trace_value("BEGIN"), "BEGIN");
        assert_eq!(redact_trace_value("CustomerNo"), "CustomerNo");
        assert_eq!(redact_trace_value("_tmp"), "_tmp");
    }

    #[test]
    fn test_long_non_identifier_values_are_truncated() {
        assert_eq!(redact_trace_value("'Secret Customer'"), "'Se…er'");
        assert_eq!(redact_trace_value("\"No. Series\""), "\"No…es\"");
    }

    #[test]
    fn test_short_values_pass_through() {
        assert_eq!(redact_trace_value(":="), ":=");
        assert_eq!(redact_trace_value("'ab'"), "'ab'");
    }

    #[test]
    fn test_format_trace_line_sanitizes_token_values_only() {
        let sink = CollectingSink::new();
        let mut lexer = Lexer::with_trace(
            "OBJECT Codeunit 1 T{CODE{VAR s@1 : Text;}}",
            Box::new(sink.clone()),
        );
        lexer.tokenize();

        let events = sink.events();
        let token_line = events
            .iter()
            .find(|e| matches!(&e.kind, TraceEventKind::Token { value, .. } if value == "OBJECT"))
            .map(|e| format_trace_line(e, true))
            .expect("OBJECT token event");
        assert!(token_line.contains("TOKEN: KEYWORD 'OBJECT'"));

        let push_line = events
            .iter()
            .find(|e| matches!(e.kind, TraceEventKind::Push { .. }))
            .map(|e| format_trace_line(e, true))
            .expect("push event");
        assert!(push_line.contains("PUSH: "));
    }

    #[test]
    fn test_string_token_is_redacted_in_trace() {
        let sink = CollectingSink::new();
        let mut lexer =
            Lexer::with_trace("x := 'Very Secret Name';", Box::new(sink.clone()));
        lexer.tokenize();

        let line = sink
            .events()
            .iter()
            .find(|e| matches!(&e.kind, TraceEventKind::Token { kind, .. } if *kind == "STRING"))
            .map(|e| format_trace_line(e, true))
            .expect("string token");
        assert!(!line.contains("Secret"));
        assert!(line.contains('…'));
    }
}
