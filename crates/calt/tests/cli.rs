//! End-to-end CLI tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn calt() -> Command {
    Command::cargo_bin("calt").expect("calt binary")
}

const CLEAN_OBJECT: &str = "OBJECT Codeunit 1 T\n{\n  CODE\n  {\n  }\n}\n";

#[test]
fn test_validate_reports_empty_corpus() {
    let dir = tempfile::tempdir().expect("tempdir");
    calt()
        .args(["validate", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No files to validate"));
}

#[test]
fn test_validate_writes_report_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("COD1.TXT"), CLEAN_OBJECT).expect("write");
    let report_path = dir.path().join("health.md");

    calt()
        .args(["validate", "--root"])
        .arg(dir.path())
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success();

    let report = fs::read_to_string(&report_path).expect("report");
    assert!(report.contains("# C/AL Lexer Health Report"));
    assert!(report.contains("- Files validated: 1"));
    assert!(report.contains("- Failed: 0"));
}

#[test]
fn test_baseline_pass_and_regression_exit_codes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("corpus");
    fs::create_dir(&corpus).expect("mkdir");
    fs::write(corpus.join("COD1.TXT"), CLEAN_OBJECT).expect("write");
    fs::write(corpus.join("COD2.TXT"), "BEGIN 'oops END\n").expect("write");

    let baseline = dir.path().join("baseline.json");
    fs::write(&baseline, r#"{"maxFailures": 1}"#).expect("write");

    calt()
        .args(["baseline", "--root"])
        .arg(&corpus)
        .arg("--baseline")
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::contains("matches baseline"));

    fs::write(&baseline, r#"{"maxFailures": 0}"#).expect("write");
    calt()
        .args(["baseline", "--root"])
        .arg(&corpus)
        .arg("--baseline")
        .arg(&baseline)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("regression"));
}

#[test]
fn test_baseline_missing_corpus_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let baseline = dir.path().join("baseline.json");
    fs::write(&baseline, r#"{"maxFailures": 0}"#).expect("write");

    calt()
        .args(["baseline", "--root"])
        .arg(dir.path().join("missing"))
        .arg("--baseline")
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIPPED"));
}

#[test]
fn test_baseline_config_error_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("corpus");
    fs::create_dir(&corpus).expect("mkdir");
    fs::write(corpus.join("COD1.TXT"), CLEAN_OBJECT).expect("write");

    calt()
        .args(["baseline", "--root"])
        .arg(&corpus)
        .arg("--baseline")
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(2);
}

#[test]
fn test_trace_banner_and_sanitized_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("COD1.TXT");
    fs::write(&file, "x := 'Very Secret Name';\n").expect("write");

    calt()
        .arg("trace")
        .arg(&file)
        .arg("--sanitize")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIDENTIAL"))
        .stdout(predicate::str::contains("TOKEN:"))
        .stdout(predicate::str::contains("Secret").not());
}

#[test]
fn test_parse_prints_sanitized_diagnostics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("COD1.TXT");
    fs::write(&file, "VAR\n SecretVar : Integer\nBEGIN END;\n").expect("write");

    calt()
        .arg("parse")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Expected ; after variable declaration"))
        .stdout(predicate::str::contains("SecretVar").not());
}

#[test]
fn test_parse_clean_file_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("COD1.TXT");
    fs::write(&file, CLEAN_OBJECT).expect("write");

    calt().arg("parse").arg(&file).assert().success();
}

#[test]
fn test_version_check_annotation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let package = dir.path().join("package.json");
    let baseline = dir.path().join("baseline.json");
    fs::write(&package, r#"{"version": "2.0.0"}"#).expect("write");
    fs::write(&baseline, r#"{"maxFailures": 0, "version": "1.9.0"}"#).expect("write");

    calt()
        .args(["version-check", "--package"])
        .arg(&package)
        .arg("--baseline")
        .arg(&baseline)
        .arg("--annotate")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("::warning::"));

    // Matching versions stay silent.
    fs::write(&package, r#"{"version": "1.9.0"}"#).expect("write");
    calt()
        .args(["version-check", "--package"])
        .arg(&package)
        .arg("--baseline")
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
