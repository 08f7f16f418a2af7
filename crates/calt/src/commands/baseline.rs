//! Baseline ratchet: the corpus failure count may stay equal or go down,
//! never up.
//!
//! Exit codes: `0` (PASS) when the count is at or below the baseline, or
//! when the corpus directory does not exist at all (SKIPPED); `1`
//! (REGRESSION) when the count grew; `2` (CONFIG_ERROR) when the baseline
//! file is missing, unparseable or lacks a numeric `maxFailures`, or the
//! corpus directory exists but is empty or unreadable.

use std::fs;
use std::path::Path;

use super::corpus::run_corpus;

/// Process exit codes for the ratchet.
pub const EXIT_PASS: i32 = 0;
pub const EXIT_REGRESSION: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Outcome of comparing a failure count against the stored baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaselineComparison {
    /// True when the count did not regress.
    pub passed: bool,
    /// `baseline - actual`; negative on regression.
    pub improvement: i64,
    /// True when the baseline should be ratcheted down.
    pub requires_baseline_update: bool,
    /// Presentation-ready summary line.
    pub message: String,
}

/// Compare an observed failure count against the baseline.
pub fn compare_to_baseline(actual: i64, baseline: i64) -> BaselineComparison {
    let improvement = baseline - actual;
    let failure_word = if actual == 1 { "failure" } else { "failures" };

    if actual == baseline {
        BaselineComparison {
            passed: true,
            improvement,
            requires_baseline_update: false,
            message: format!("{actual} {failure_word} matches baseline"),
        }
    } else if actual < baseline {
        BaselineComparison {
            passed: true,
            improvement,
            requires_baseline_update: true,
            message: format!(
                "{actual} {failure_word}, improvement detected: {improvement} fewer than baseline {baseline}"
            ),
        }
    } else {
        BaselineComparison {
            passed: false,
            improvement,
            requires_baseline_update: false,
            message: format!(
                "{actual} {failure_word}, regression: {} more than baseline {baseline}",
                actual - baseline
            ),
        }
    }
}

/// Read `maxFailures` out of the baseline JSON file.
fn read_max_failures(baseline_path: &Path) -> Option<i64> {
    let text = fs::read_to_string(baseline_path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&text).ok()?;
    json.get("maxFailures").and_then(|v| v.as_i64())
}

/// Run the ratchet check and return the process exit code.
pub fn run_baseline_check(root: &Path, baseline_path: &Path) -> i32 {
    if !root.exists() {
        println!(
            "SKIPPED: corpus directory {} does not exist",
            root.display()
        );
        return EXIT_PASS;
    }

    let Some(max_failures) = read_max_failures(baseline_path) else {
        eprintln!(
            "CONFIG_ERROR: baseline {} is missing, unparseable, or has no numeric maxFailures",
            baseline_path.display()
        );
        return EXIT_CONFIG_ERROR;
    };

    let results = match run_corpus(root) {
        Ok(results) => results,
        Err(err) => {
            eprintln!(
                "CONFIG_ERROR: corpus directory {} is unreadable: {err}",
                root.display()
            );
            return EXIT_CONFIG_ERROR;
        }
    };
    if results.is_empty() {
        eprintln!(
            "CONFIG_ERROR: corpus directory {} is present but contains no .txt files",
            root.display()
        );
        return EXIT_CONFIG_ERROR;
    }

    let actual = results.iter().filter(|r| !r.passed()).count() as i64;
    let comparison = compare_to_baseline(actual, max_failures);
    println!("{}", comparison.message);
    if comparison.requires_baseline_update {
        println!(
            "Baseline can be lowered to {actual} in {}",
            baseline_path.display()
        );
    }

    if comparison.passed {
        EXIT_PASS
    } else {
        EXIT_REGRESSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_equal_count_matches_baseline_singular() {
        let comparison = compare_to_baseline(1, 1);
        assert!(comparison.passed);
        assert_eq!(comparison.improvement, 0);
        assert!(!comparison.requires_baseline_update);
        assert!(comparison.message.contains("1 failure "));
        assert!(comparison.message.contains("matches baseline"));
    }

    #[test]
    fn test_improvement_requests_baseline_update() {
        let comparison = compare_to_baseline(5, 10);
        assert!(comparison.passed);
        assert_eq!(comparison.improvement, 5);
        assert!(comparison.requires_baseline_update);
        assert!(comparison.message.contains("improvement detected"));
        assert!(comparison.message.contains("5 failures"));
    }

    #[test]
    fn test_regression_is_flagged() {
        let comparison = compare_to_baseline(11, 10);
        assert!(!comparison.passed);
        assert_eq!(comparison.improvement, -1);
        assert!(!comparison.requires_baseline_update);
        assert!(comparison.message.contains("regression"));
        assert!(comparison.message.contains('1'));
    }

    #[test]
    fn test_zero_failures_plural() {
        let comparison = compare_to_baseline(0, 0);
        assert!(comparison.message.contains("0 failures"));
    }

    #[test]
    fn test_missing_corpus_directory_skips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let baseline = dir.path().join("baseline.json");
        fs::write(&baseline, r#"{"maxFailures": 0}"#).expect("write");
        let missing_root = dir.path().join("no-such-dir");
        assert_eq!(run_baseline_check(&missing_root, &baseline), EXIT_PASS);
    }

    #[test]
    fn test_missing_baseline_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("COD1.TXT"), "BEGIN END").expect("write");
        let missing_baseline = dir.path().join("no-baseline.json");
        assert_eq!(
            run_baseline_check(dir.path(), &missing_baseline),
            EXIT_CONFIG_ERROR
        );
    }

    #[test]
    fn test_non_numeric_max_failures_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("COD1.TXT"), "BEGIN END").expect("write");
        let baseline = dir.path().join("baseline.json");
        fs::write(&baseline, r#"{"maxFailures": "lots"}"#).expect("write");
        assert_eq!(run_baseline_check(dir.path(), &baseline), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_empty_corpus_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let baseline = dir.path().join("baseline.json");
        fs::write(&baseline, r#"{"maxFailures": 0}"#).expect("write");
        let corpus = dir.path().join("corpus");
        fs::create_dir(&corpus).expect("mkdir");
        assert_eq!(run_baseline_check(&corpus, &baseline), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_pass_and_regression_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let corpus = dir.path().join("corpus");
        fs::create_dir(&corpus).expect("mkdir");
        fs::write(
            corpus.join("COD1.TXT"),
            "OBJECT Codeunit 1 T\n{\n  CODE\n  {\n  }\n}\n",
        )
        .expect("write");
        // An unterminated string makes this file fail the clean-exit check.
        fs::write(corpus.join("COD2.TXT"), "BEGIN 'oops END").expect("write");

        let baseline = dir.path().join("baseline.json");
        fs::write(&baseline, r#"{"maxFailures": 1}"#).expect("write");
        assert_eq!(run_baseline_check(&corpus, &baseline), EXIT_PASS);

        fs::write(&baseline, r#"{"maxFailures": 0}"#).expect("write");
        assert_eq!(run_baseline_check(&corpus, &baseline), EXIT_REGRESSION);
    }
}
