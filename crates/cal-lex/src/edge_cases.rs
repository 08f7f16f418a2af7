//! Lexer behavior tests over whole inputs.

#![cfg(test)]

use cal_util::Keyword;

use crate::clean_exit::{CleanExitOptions, ViolationCategory};
use crate::context::LexerContext;
use crate::position::validate_token_positions;
use crate::token::TokenKind;
use crate::trace::{CollectingSink, TraceEventKind};
use crate::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
}

fn assert_clean(source: &str) {
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(result.passed, "violations: {:?}", result.violations);
}

#[test]
fn test_empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_clean("");
}

#[test]
fn test_simple_statement_tokens() {
    assert_eq!(
        kinds("X := 1;"),
        vec![
            TokenKind::Ident,
            TokenKind::Assign,
            TokenKind::Integer,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    let tokens = Lexer::new("begin End WHILE").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Begin));
    assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::End));
    assert_eq!(tokens[2].kind, TokenKind::Keyword(Keyword::While));
    // Values keep the source spelling.
    assert_eq!(tokens[0].value, "begin");
    assert_eq!(tokens[1].value, "End");
}

#[test]
fn test_operators_and_punctuation() {
    assert_eq!(
        kinds(":= += -= *= /= <> <= >= :: .. < > = . : @"),
        vec![
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::ColonColon,
            TokenKind::DotDot,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Eq,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::At,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numbers() {
    let tokens = Lexer::new("42 3.14 1..5").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[1].kind, TokenKind::Decimal);
    assert_eq!(tokens[1].value, "3.14");
    // A dot only joins a number when a digit follows.
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[3].kind, TokenKind::DotDot);
    assert_eq!(tokens[4].kind, TokenKind::Integer);
}

#[test]
fn test_string_literal_with_doubled_quote() {
    let tokens = Lexer::new("'O''Brien'").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[0].value, "'O''Brien'");
    assert_clean("'O''Brien'");
}

#[test]
fn test_unterminated_string_is_unknown_with_violation() {
    let mut lexer = Lexer::new("'abc");
    let tokens = lexer.tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert_eq!(tokens[1].kind, TokenKind::Eof);

    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(!result.passed);
    assert!(result
        .categories
        .contains(&ViolationCategory::UnterminatedLiteral));
}

#[test]
fn test_unterminated_quoted_identifier() {
    let mut lexer = Lexer::new("\"No. Series\n");
    let tokens = lexer.tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(result
        .categories
        .contains(&ViolationCategory::UnterminatedLiteral));
}

#[test]
fn test_quoted_identifier() {
    let tokens = Lexer::new("\"No. Series\"").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::QuotedIdent);
    assert_eq!(tokens[0].value, "\"No. Series\"");
}

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        kinds("X // trailing note\n:= 1"),
        vec![
            TokenKind::Ident,
            TokenKind::Assign,
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_object_context_round_trip() {
    let source = "OBJECT Table 18 Customer\n{\n}\n";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Object));
    assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Table));
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[3].kind, TokenKind::Ident);

    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(result.passed, "violations: {:?}", result.violations);
    assert_eq!(lexer.contexts(), &[LexerContext::Normal]);
    assert!(lexer.flags().balanced());
}

#[test]
fn test_code_section_with_brace_comment() {
    // Inside CODE, `{ ... }` is a comment; the section braces stay balanced.
    let source = "OBJECT Codeunit 1 T{CODE{PROCEDURE P@1();BEGIN {note} END;}}";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    assert!(tokens
        .iter()
        .all(|t| t.kind != TokenKind::Unknown));
    // The comment text never becomes a token.
    assert!(!tokens.iter().any(|t| t.value == "note"));
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(result.passed, "violations: {:?}", result.violations);
}

#[test]
fn test_section_keyword_requires_left_brace() {
    // `Code[20]` must not open a section: the bracket keeps it a datatype.
    let source = "OBJECT Codeunit 1 T{CODE{VAR x@1 : Code[20];}}";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let code_keywords: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Keyword(Keyword::Code))
        .collect();
    assert_eq!(code_keywords.len(), 2);
    assert!(lexer.is_clean_exit(CleanExitOptions::default()).passed);
}

#[test]
fn test_fields_rows_are_structural() {
    let source = "OBJECT Table 18 T{FIELDS{{1;;Name;Code[20]}{2;;Amt;Decimal}}}";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let braces = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::LBrace)
        .count();
    // Object body, FIELDS section, and two rows.
    assert_eq!(braces, 4);
    assert!(lexer.is_clean_exit(CleanExitOptions::default()).passed);
}

#[test]
fn test_object_properties_hyphenated_keyword() {
    let source = "OBJECT Table 1 T{OBJECT-PROPERTIES{Date=01-01-20;}}";
    let tokens = Lexer::new(source).tokenize();
    assert_eq!(
        tokens[5].kind,
        TokenKind::Keyword(Keyword::ObjectProperties)
    );
    assert_eq!(tokens[5].value, "OBJECT-PROPERTIES");
    assert_clean(source);
}

#[test]
fn test_dotnet_payload_is_one_token() {
    let source = "VAR X@1 : DotNet \"'mscorlib'.System.String\";";
    let tokens = Lexer::new(source).tokenize();
    let payload = tokens
        .iter()
        .find(|t| t.kind == TokenKind::QuotedIdent)
        .expect("payload token");
    assert_eq!(payload.value, "\"'mscorlib'.System.String\"");
    assert_clean(source);
}

#[test]
fn test_automation_payload_preserves_braces() {
    // Braces and apostrophes inside the payload touch neither the counters
    // nor the context stack.
    let source =
        "VAR A@1 : Automation \"{F9A1}: 1.0:{C4D2}:'O''Reilly''s Library'.Cls\" WITHEVENTS;";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let payload = tokens
        .iter()
        .find(|t| t.kind == TokenKind::QuotedIdent)
        .expect("payload token");
    assert!(payload.value.contains("O''Reilly"));
    assert!(lexer.flags().balanced());
    assert!(lexer.is_clean_exit(CleanExitOptions::default()).passed);
}

#[test]
fn test_type_literal_contexts_appear_in_trace() {
    let sink = CollectingSink::new();
    let mut lexer = Lexer::with_trace(
        "VAR X@1 : DotNet \"'asm'.T\";",
        Box::new(sink.clone()),
    );
    lexer.tokenize();
    let events = sink.events();
    assert!(events.iter().any(|e| matches!(
        e.kind,
        TraceEventKind::Push {
            context: LexerContext::DotNetTypeLiteral
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e.kind,
        TraceEventKind::Pop {
            context: LexerContext::DotNetTypeLiteral
        }
    )));
}

#[test]
fn test_preprocessor_marker() {
    let tokens = Lexer::new("#pragma warning disable").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::PreprocMarker);
    assert_eq!(tokens[0].value, "#pragma");
    assert_eq!(tokens[1].kind, TokenKind::Ident);

    let bare = Lexer::new("# 1").tokenize();
    assert_eq!(bare[0].kind, TokenKind::Unknown);
}

#[test]
fn test_trace_records_section_push() {
    let sink = CollectingSink::new();
    let mut lexer = Lexer::with_trace("OBJECT Codeunit 1 T{CODE{}}", Box::new(sink.clone()));
    lexer.tokenize();
    let events = sink.events();
    assert!(events.iter().any(|e| matches!(
        e.kind,
        TraceEventKind::Push {
            context: LexerContext::CodeSection
        }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, TraceEventKind::Flag { name: "braceDepth", .. })));
}

#[test]
fn test_rdldata_balanced_content_is_skipped() {
    let source = "OBJECT Report 3 R{RDLDATA{<Report>{x}</Report>}}";
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    // The XML never becomes tokens.
    assert!(tokens.iter().all(|t| t.kind != TokenKind::Unknown));
    assert!(!tokens.iter().any(|t| t.value.contains("Report>")));
    assert!(lexer.is_clean_exit(CleanExitOptions::default()).passed);
}

#[test]
fn test_rdldata_underflow_is_isolated_and_suppressible() {
    // The content swallows its closing markers and runs to end of input.
    let source = "OBJECT Report 3 R{RDLDATA{<Code>if (x) {</Code>";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();

    let strict = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(!strict.passed);
    assert_eq!(strict.violations.len(), 1);
    assert!(strict
        .categories
        .contains(&ViolationCategory::RdldataUnderflow));

    let relaxed = lexer.is_clean_exit(CleanExitOptions {
        allow_rdldata_underflow: true,
    });
    assert!(relaxed.passed);
}

#[test]
fn test_unbalanced_braces_reported() {
    let source = "OBJECT Table 1 T{FIELDS{";
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(!result.passed);
    assert!(result
        .categories
        .contains(&ViolationCategory::UnbalancedBrace));
    assert!(result
        .categories
        .contains(&ViolationCategory::StackMismatch));
    let mismatch = result
        .violations
        .iter()
        .find(|v| v.category == ViolationCategory::StackMismatch)
        .expect("stack mismatch violation");
    assert_eq!(mismatch.expected, "[NORMAL]");
}

#[test]
fn test_unbalanced_parens_and_brackets() {
    let mut lexer = Lexer::new("F(a[1;");
    lexer.tokenize();
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    let cats = &result.categories;
    assert!(cats.contains(&ViolationCategory::UnbalancedParen));
    assert!(cats.contains(&ViolationCategory::UnbalancedBracket));
}

#[test]
fn test_clean_exit_before_tokenize() {
    let lexer = Lexer::new("BEGIN END");
    let result = lexer.is_clean_exit(CleanExitOptions::default());
    assert!(!result.passed);
    assert!(result
        .categories
        .contains(&ViolationCategory::StackMismatch));
}

#[test]
fn test_tokenize_is_restartable() {
    let mut lexer = Lexer::new("OBJECT Codeunit 1 T{CODE{}}");
    let first = lexer.tokenize();
    let second = lexer.tokenize();
    assert_eq!(first, second);
    assert!(lexer.is_clean_exit(CleanExitOptions::default()).passed);
}

#[test]
fn test_positions_on_multiline_source() {
    let source = "IF a THEN\n  b := 2;";
    let tokens = Lexer::new(source).tokenize();
    let b = tokens.iter().find(|t| t.value == "b").expect("b token");
    assert_eq!(b.line, 2);
    assert_eq!(b.column, 3);
    assert!(validate_token_positions(source, &tokens).is_valid);
}

#[test]
fn test_unknown_character() {
    let tokens = Lexer::new("a ? b").tokenize();
    assert_eq!(tokens[1].kind, TokenKind::Unknown);
    assert_eq!(tokens[1].value, "?");
    // Unknown characters do not break position bookkeeping.
    let source = "a ? b";
    assert!(validate_token_positions(source, &tokens).is_valid);
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Two runs over the same input yield identical streams and verdicts.
        #[test]
        fn prop_lexer_is_deterministic(source in "[ -~\n]{0,200}") {
            let mut first = Lexer::new(&source);
            let tokens_a = first.tokenize();
            let clean_a = first.is_clean_exit(CleanExitOptions::default());

            let mut second = Lexer::new(&source);
            let tokens_b = second.tokenize();
            let clean_b = second.is_clean_exit(CleanExitOptions::default());

            prop_assert_eq!(tokens_a, tokens_b);
            prop_assert_eq!(clean_a.passed, clean_b.passed);
            prop_assert_eq!(clean_a.categories, clean_b.categories);
        }

        /// Every emitted token reproduces its source slice and position.
        #[test]
        fn prop_positions_round_trip(source in "[ -~\n]{0,200}") {
            let tokens = Lexer::new(&source).tokenize();
            let validation = validate_token_positions(&source, &tokens);
            prop_assert!(validation.is_valid, "errors: {:?}", validation.errors);
        }

        /// The stream always ends with exactly one EOF sentinel.
        #[test]
        fn prop_stream_is_eof_terminated(source in "[ -~\n]{0,200}") {
            let tokens = Lexer::new(&source).tokenize();
            prop_assert!(!tokens.is_empty());
            prop_assert_eq!(&tokens.last().unwrap().kind, &TokenKind::Eof);
            let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
            prop_assert_eq!(eofs, 1);
        }
    }
}
