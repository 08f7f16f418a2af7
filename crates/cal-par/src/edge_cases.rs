//! Parser behavior tests over whole inputs.

#![cfg(test)]

use cal_lex::Lexer;

use crate::ast::{
    BinaryOp, DataType, ExpressionKind, Literal, ObjectKind, StatementKind, UnaryOp,
};
use crate::{CalDocument, ParseError, Parser};

fn parse(source: &str) -> (CalDocument, Vec<ParseError>) {
    let tokens = Lexer::new(source).tokenize();
    let mut parser = Parser::new(tokens);
    let document = parser.parse();
    let errors = parser.errors().to_vec();
    (document, errors)
}

fn parse_clean(source: &str) -> CalDocument {
    let (document, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    document
}

// ---------------------------------------------------------------------
// Dangling ELSE
// ---------------------------------------------------------------------

#[test]
fn test_dangling_else_binds_to_inner_if() {
    let document = parse_clean("IF a THEN IF b THEN x := 1 ELSE y := 2;");
    let StatementKind::If {
        then_branch,
        else_branch,
        ..
    } = &document.statements[0].kind
    else {
        panic!("expected IF");
    };
    assert!(else_branch.is_none(), "outer IF must not claim the ELSE");

    let StatementKind::If {
        else_branch: inner_else,
        ..
    } = &then_branch.kind
    else {
        panic!("expected nested IF");
    };
    assert!(inner_else.is_some(), "inner IF claims the ELSE");
}

#[test]
fn test_semicolon_hands_else_to_outer_if() {
    let document = parse_clean("IF a THEN IF b THEN x := 1; ELSE y := 2;");
    let StatementKind::If {
        then_branch,
        else_branch,
        ..
    } = &document.statements[0].kind
    else {
        panic!("expected IF");
    };
    assert!(else_branch.is_some(), "outer IF claims the ELSE");

    let StatementKind::If {
        else_branch: inner_else,
        ..
    } = &then_branch.kind
    else {
        panic!("expected nested IF");
    };
    assert!(inner_else.is_none(), "inner IF has no ELSE");
}

#[test]
fn test_orphaned_else_is_rejected() {
    let (_, errors) = parse("BEGIN IF a THEN x := 1; ELSE y := 2 END");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot start with ELSE"));
}

// ---------------------------------------------------------------------
// REPEAT
// ---------------------------------------------------------------------

#[test]
fn test_repeat_missing_until_reports_at_repeat_keyword() {
    let source =
        "OBJECT Codeunit 50000 T{CODE{PROCEDURE P();BEGIN REPEAT X:=1; END; END;}}";
    let (document, errors) = parse(source);

    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("Expected UNTIL"));
    assert_eq!(errors[0].token().value, "REPEAT");

    let object = document.object.expect("object");
    assert_eq!(object.kind, ObjectKind::Codeunit);
    assert_eq!(object.id, 50000);
    let code = object.code.expect("code section");
    assert_eq!(code.procedures.len(), 1);
}

#[test]
fn test_repeat_with_until_parses_clean() {
    let document = parse_clean("REPEAT x := x + 1; UNTIL x > 10;");
    let StatementKind::Repeat { body, condition } = &document.statements[0].kind else {
        panic!("expected REPEAT");
    };
    assert_eq!(body.len(), 1);
    assert!(condition.is_some());
}

// ---------------------------------------------------------------------
// CASE
// ---------------------------------------------------------------------

#[test]
fn test_case_missing_colon_recovery() {
    let (document, errors) = parse("CASE x OF 1 MESSAGE('a'); 2: MESSAGE('b'); END;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Expected : after CASE branch value"));

    let StatementKind::Case { branches, .. } = &document.statements[0].kind else {
        panic!("expected CASE");
    };
    assert_eq!(branches.len(), 2, "no phantom branch for call arguments");
    assert_eq!(branches[0].values.len(), 1);
    assert!(branches[0].statements.is_empty());
    assert_eq!(branches[1].values.len(), 1);
    assert_eq!(branches[1].statements.len(), 1);
}

#[test]
fn test_case_colon_recovery_skips_argument_identifiers() {
    let (document, errors) = parse("CASE x OF 1 F(a,b,c); Ready: G; END;");
    assert_eq!(errors.len(), 1);

    let StatementKind::Case { branches, .. } = &document.statements[0].kind else {
        panic!("expected CASE");
    };
    assert_eq!(branches.len(), 2);
    assert!(matches!(
        branches[0].values[0].kind,
        ExpressionKind::Literal(Literal::Integer(1))
    ));
    assert!(branches[0].statements.is_empty());
    assert!(
        matches!(&branches[1].values[0].kind, ExpressionKind::Identifier(name) if name == "Ready")
    );
}

#[test]
fn test_case_with_ranges_values_and_else() {
    let document =
        parse_clean("CASE x OF 1,2: y := 1; 3..5: y := 2; ELSE y := 3; z := 4; END;");
    let StatementKind::Case {
        branches,
        else_branch,
        ..
    } = &document.statements[0].kind
    else {
        panic!("expected CASE");
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].values.len(), 2);
    assert!(matches!(
        branches[1].values[0].kind,
        ExpressionKind::Binary {
            op: BinaryOp::Range,
            ..
        }
    ));
    assert_eq!(else_branch.len(), 2, "multiple statements after ELSE");
}

// ---------------------------------------------------------------------
// END scoping
// ---------------------------------------------------------------------

#[test]
fn test_empty_then_body_leaves_end_for_enclosing_block() {
    let source = "OBJECT Codeunit 1 T{CODE{\
PROCEDURE P@1();\nBEGIN\nIF c THEN // nothing yet\nEND;\n\
PROCEDURE Q@2();\nBEGIN\nEND;\n}}";
    let (document, errors) = parse(source);
    assert!(errors.is_empty(), "errors: {errors:?}");

    let code = document.object.expect("object").code.expect("code");
    assert_eq!(code.procedures.len(), 2, "two top-level procedures");
    assert_eq!(code.procedures[0].name, "P");
    assert_eq!(code.procedures[1].name, "Q");

    let StatementKind::If { then_branch, .. } = &code.procedures[0].body[0].kind else {
        panic!("expected IF");
    };
    assert!(matches!(then_branch.kind, StatementKind::Empty));
}

// ---------------------------------------------------------------------
// Cross-line error attribution
// ---------------------------------------------------------------------

#[test]
fn test_missing_semicolon_reported_on_declaration_line() {
    let (document, errors) = parse("VAR\n x : Integer\n BEGIN END;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Expected ; after variable declaration");
    assert_eq!(errors[0].line(), 2, "line of Integer, not of BEGIN");
    assert_eq!(document.variables.len(), 1);
}

#[test]
fn test_missing_then_reported_on_condition_line() {
    let (_, errors) = parse("IF a\n  b := 1;");
    assert!(!errors.is_empty());
    assert_eq!(errors[0].message, "Expected THEN after IF condition");
    assert_eq!(errors[0].line(), 1);
}

// ---------------------------------------------------------------------
// Keywords as names
// ---------------------------------------------------------------------

#[test]
fn test_keyword_as_parameter_name() {
    let source = "PROCEDURE F@1(VAR Table@1 : DotNet \"'mscorlib'.System.String\") : Boolean;\nBEGIN\nEND;\n";
    let document = parse_clean(source);

    let procedure = &document.procedures[0];
    assert_eq!(procedure.parameters.len(), 1);
    let parameter = &procedure.parameters[0];
    assert_eq!(parameter.name, "Table");
    assert!(parameter.is_var);
    assert_eq!(
        parameter.data_type,
        Some(DataType::DotNet {
            assembly_reference: Some("mscorlib".to_string()),
            type_name: Some("System.String".to_string()),
        })
    );
    assert!(matches!(
        procedure.return_type,
        Some(DataType::Primitive { ref name, .. }) if name == "Boolean"
    ));
}

#[test]
fn test_reserved_keyword_rejected_as_variable_name() {
    let (document, errors) = parse("VAR\nWHILE : Integer;\nx : Integer;\n");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Reserved keyword WHILE"));
    assert_eq!(document.variables.len(), 1);
    assert_eq!(document.variables[0].name, "x");
}

// ---------------------------------------------------------------------
// Datatypes
// ---------------------------------------------------------------------

#[test]
fn test_datatype_forms() {
    let source = "VAR\n\
        r@1 : Record 18;\n\
        a@2 : ARRAY[5] OF Integer;\n\
        s@3 : 'Open,Released';\n\
        t@4 : Text[30];\n\
        c@5 : Code[20];\n\
        o@6 : Option;\n";
    let document = parse_clean(source);
    let types: Vec<&DataType> = document
        .variables
        .iter()
        .map(|v| v.data_type.as_ref().expect("type"))
        .collect();

    assert_eq!(types[0], &DataType::Record { table_id: 18 });
    assert_eq!(
        types[1],
        &DataType::Array {
            length: 5,
            element: Box::new(DataType::Primitive {
                name: "Integer".to_string(),
                length: None,
            }),
        }
    );
    assert_eq!(
        types[2],
        &DataType::Option {
            option_string: Some("Open,Released".to_string()),
        }
    );
    assert_eq!(
        types[3],
        &DataType::Primitive {
            name: "Text".to_string(),
            length: Some(30),
        }
    );
    assert_eq!(
        types[4],
        &DataType::Primitive {
            name: "Code".to_string(),
            length: Some(20),
        }
    );
    assert_eq!(types[5], &DataType::Option { option_string: None });
}

#[test]
fn test_automation_payload_unescapes_doubled_quotes() {
    let source = "VAR\nA@1 : Automation \"{1111-2222} 1.0:{3333-4444}:'O''Reilly''s Library'.C\" WITHEVENTS;\n";
    let document = parse_clean(source);

    let DataType::Automation {
        type_lib_guid,
        version,
        class_guid,
        type_lib_name,
        class_name,
    } = document.variables[0].data_type.as_ref().expect("type")
    else {
        panic!("expected Automation");
    };
    assert_eq!(type_lib_guid.as_deref(), Some("1111-2222"));
    assert_eq!(version.as_deref(), Some("1.0"));
    assert_eq!(class_guid.as_deref(), Some("3333-4444"));
    assert_eq!(type_lib_name.as_deref(), Some("O'Reilly's Library"));
    assert_eq!(class_name.as_deref(), Some("C"));
    assert!(document.variables[0].with_events);
}

#[test]
fn test_invalid_automation_payload_keeps_partial_fields() {
    let (document, errors) = parse("VAR\nA@1 : Automation \"{1111-2222} oops\";\n");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Invalid Automation type reference"));

    let DataType::Automation {
        type_lib_guid,
        class_name,
        ..
    } = document.variables[0].data_type.as_ref().expect("type")
    else {
        panic!("expected Automation");
    };
    assert_eq!(type_lib_guid.as_deref(), Some("1111-2222"));
    assert!(class_name.is_none());
}

#[test]
fn test_dotnet_runonclient_modifier() {
    let document = parse_clean("VAR\nd@1 : DotNet \"'a'.B\" RUNONCLIENT;\n");
    assert!(document.variables[0].run_on_client);
    assert!(!document.variables[0].with_events);
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let document = parse_clean("x := 1 + 2 * 3;");
    let StatementKind::Assignment { value, .. } = &document.statements[0].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary {
        op: BinaryOp::Add,
        right,
        ..
    } = &value.kind
    else {
        panic!("expected + at the top");
    };
    assert!(matches!(
        right.kind,
        ExpressionKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_and_binds_tighter_than_or() {
    let document = parse_clean("x := a AND b OR c;");
    let StatementKind::Assignment { value, .. } = &document.statements[0].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary {
        op: BinaryOp::Or,
        left,
        ..
    } = &value.kind
    else {
        panic!("expected OR at the top");
    };
    assert!(matches!(
        left.kind,
        ExpressionKind::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
}

#[test]
fn test_not_is_prefix_tightest() {
    let document = parse_clean("x := NOT a AND b;");
    let StatementKind::Assignment { value, .. } = &document.statements[0].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary {
        op: BinaryOp::And,
        left,
        ..
    } = &value.kind
    else {
        panic!("expected AND at the top");
    };
    assert!(matches!(
        left.kind,
        ExpressionKind::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
}

#[test]
fn test_postfix_chain_member_index_namespace_call() {
    let document = parse_clean("Rec.Amount[1] := Status::Open; F(a, b);");
    let StatementKind::Assignment { target, .. } = &document.statements[0].kind else {
        panic!("expected assignment");
    };
    let ExpressionKind::Index { base, indices } = &target.kind else {
        panic!("expected index");
    };
    assert_eq!(indices.len(), 1);
    assert!(matches!(
        &base.kind,
        ExpressionKind::Member { name, .. } if name == "Amount"
    ));

    let StatementKind::Call(call) = &document.statements[1].kind else {
        panic!("expected call statement");
    };
    let ExpressionKind::Call { args, .. } = &call.kind else {
        panic!("expected call expression");
    };
    assert_eq!(args.len(), 2);
}

#[test]
fn test_string_literal_unescaping_in_expressions() {
    let document = parse_clean("x := 'It''s fine';");
    let StatementKind::Assignment { value, .. } = &document.statements[0].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(
        &value.kind,
        ExpressionKind::Literal(Literal::Str(s)) if s == "It's fine"
    ));
}

// ---------------------------------------------------------------------
// Sanitization boundary
// ---------------------------------------------------------------------

#[test]
fn test_error_messages_never_leak_source_identifiers() {
    let sources = [
        "CASE SecretExpr OF SecretVal MESSAGE('SecretArg'); END;",
        "BEGIN SecretA SecretB; END",
        "VAR SecretName : SecretType\nBEGIN END;",
        "BEGIN interface END",
        "PROCEDURE SecretProc@1(SecretParam Integer);BEGIN END;",
    ];
    for source in sources {
        let (_, errors) = parse(source);
        assert!(!errors.is_empty(), "expected errors for {source}");
        for error in &errors {
            assert!(
                !error.message.contains("Secret") && !error.message.contains("interface"),
                "leaked content in message {:?} for {source}",
                error.message
            );
        }
    }
}

#[test]
fn test_al_only_tokens_are_flagged_by_kind() {
    let (_, errors) = parse("BEGIN interface END");
    assert!(errors[0].message.starts_with("AL-only keyword"));

    let (_, errors) = parse("BEGIN protected END");
    assert!(errors[0].message.starts_with("AL-only access modifier"));

    let (_, errors) = parse("BEGIN #pragma END");
    assert!(errors[0].message.starts_with("AL-only preprocessor directive"));
}

// ---------------------------------------------------------------------
// Whole objects
// ---------------------------------------------------------------------

const CUSTOMER_TABLE: &str = "OBJECT Table 18 Customer\n\
{\n\
  OBJECT-PROPERTIES\n\
  {\n\
    Date=01-01-20;\n\
    Time=12:00:00;\n\
  }\n\
  PROPERTIES\n\
  {\n\
    CaptionML=[ENU=Customer;DAN=Debitor];\n\
    OnRun=BEGIN\n\
            MESSAGE('hi');\n\
          END;\n\
  }\n\
  FIELDS\n\
  {\n\
    { 1 ;  ;No.             ;Code[20]      }\n\
    { 2 ;  ;Name            ;Text[50]      }\n\
  }\n\
  KEYS\n\
  {\n\
    {    ;No.                              ;Clustered=Yes }\n\
  }\n\
  CODE\n\
  {\n\
    VAR\n\
      Cnt@1 : Integer;\n\
\n\
    PROCEDURE Touch@2();\n\
    BEGIN\n\
      Cnt := Cnt + 1;\n\
    END;\n\
\n\
    BEGIN\n\
    END.\n\
  }\n\
}\n";

#[test]
fn test_full_table_object() {
    let (document, errors) = parse(CUSTOMER_TABLE);
    assert!(errors.is_empty(), "errors: {errors:?}");

    let object = document.object.expect("object");
    assert_eq!(object.kind, ObjectKind::Table);
    assert_eq!(object.id, 18);
    assert_eq!(object.name, "Customer");

    let object_properties = object.object_properties.expect("OBJECT-PROPERTIES");
    assert_eq!(object_properties.properties.len(), 2);
    assert_eq!(object_properties.properties[0].name, "Date");

    let properties = object.properties.expect("PROPERTIES");
    assert_eq!(properties.properties.len(), 2);
    assert_eq!(properties.properties[1].name, "OnRun");

    let fields = object.fields.expect("FIELDS");
    assert_eq!(fields.fields.len(), 2);
    assert_eq!(fields.fields[0].number, 1);
    assert_eq!(fields.fields[0].name, "No.");
    assert_eq!(
        fields.fields[0].data_type,
        Some(DataType::Primitive {
            name: "Code".to_string(),
            length: Some(20),
        })
    );

    let keys = object.keys.expect("KEYS");
    assert_eq!(keys.keys.len(), 1);
    assert_eq!(keys.keys[0].fields, vec!["No.".to_string()]);

    let code = object.code.expect("CODE");
    assert_eq!(code.variables.len(), 1);
    assert_eq!(code.procedures.len(), 1);
    assert_eq!(code.procedures[0].name, "Touch");
    assert!(code.main_block.is_some());
}

#[test]
fn test_page_with_controls() {
    let source = "OBJECT Page 21 Customer Card\n\
{\n\
  CONTROLS\n\
  {\n\
    { 1 ;0 ;Container ;ContainerType=ContentArea }\n\
    { 2 ;1 ;Group     ;GroupType=Group }\n\
  }\n\
}\n";
    let (document, errors) = parse(source);
    assert!(errors.is_empty(), "errors: {errors:?}");

    let object = document.object.expect("object");
    assert_eq!(object.kind, ObjectKind::Page);
    assert_eq!(object.name, "Customer Card");

    let controls = object.controls.expect("CONTROLS");
    assert_eq!(controls.controls.len(), 2);
    assert_eq!(controls.controls[0].id, 1);
    assert_eq!(controls.controls[0].kind, "Container");
}

#[test]
fn test_report_with_rdldata() {
    let source =
        "OBJECT Report 111 Sales\n{\n  RDLDATA\n  {\n<Report><Body>{x}</Body></Report>\n  }\n}\n";
    let (document, errors) = parse(source);
    assert!(errors.is_empty(), "errors: {errors:?}");

    let object = document.object.expect("object");
    assert_eq!(object.kind, ObjectKind::Report);
    assert!(object.rdldata.is_some());
}

#[test]
fn test_document_without_object() {
    let (document, errors) = parse("");
    assert!(document.object.is_none());
    assert!(errors.is_empty());

    let (document, errors) = parse("x := 1;");
    assert!(document.object.is_none());
    assert_eq!(document.statements.len(), 1);
    assert!(errors.is_empty());
}

#[test]
fn test_parser_never_loops_on_garbage() {
    // A soup of closers, openers and unknown tokens must terminate and
    // produce errors rather than hang.
    let (_, errors) = parse("} ) ] ?? END UNTIL ELSE ; ; { ( [ OBJECT");
    assert!(!errors.is_empty());
}

#[test]
fn test_exit_with_argument() {
    let document = parse_clean("BEGIN EXIT(Total + 1); END");
    let StatementKind::Block(statements) = &document.statements[0].kind else {
        panic!("expected block");
    };
    assert!(matches!(
        statements[0].kind,
        StatementKind::Exit(Some(_))
    ));
}

#[test]
fn test_for_downto_and_while() {
    let document = parse_clean("FOR i := 10 DOWNTO 1 DO x := x + i; WHILE x > 0 DO x := x - 1;");
    let StatementKind::For { downto, .. } = &document.statements[0].kind else {
        panic!("expected FOR");
    };
    assert!(*downto);
    assert!(matches!(
        document.statements[1].kind,
        StatementKind::While { .. }
    ));
}

#[test]
fn test_with_statement() {
    let document = parse_clean("WITH Rec DO BEGIN x := 1; END;");
    let StatementKind::With { body, .. } = &document.statements[0].kind else {
        panic!("expected WITH");
    };
    assert!(matches!(body.kind, StatementKind::Block(_)));
}

#[test]
fn test_diagnostic_projection_carries_only_numeric_metadata() {
    let (_, errors) = parse("VAR\n x : Integer\n BEGIN END;");
    let diagnostic = errors[0].to_diagnostic();
    assert_eq!(diagnostic.source, "cal");
    assert_eq!(diagnostic.range.start.line, errors[0].line() - 1);
    assert_eq!(diagnostic.range.start.character, errors[0].column() - 1);
    assert_eq!(diagnostic.message, errors[0].message);
}
