//! Markdown health report over corpus results.
//!
//! Every variable piece of text, file names, error messages, violation
//! fields, is markdown-escaped before it lands in the document, so a field
//! named `a|b` cannot break a table or smuggle formatting into CI comments.

use indexmap::IndexMap;

use cal_util::{escape_markdown, percentile};

use super::corpus::FileResult;

/// Totals side-channel for callers that only retain failing results.
#[derive(Clone, Copy, Debug)]
pub struct CorpusTotals {
    pub total_files: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Outlier threshold: strictly greater than twice the p95.
const OUTLIER_FACTOR: f64 = 2.0;

/// Render the health report.
///
/// `totals` overrides the summary counts when the result list has been
/// filtered down to failures only.
pub fn render_health_report(results: &[FileResult], totals: Option<&CorpusTotals>) -> String {
    let mut out = String::from("# C/AL Lexer Health Report\n");

    let empty = results.is_empty() && totals.map_or(true, |t| t.total_files == 0);
    if empty {
        out.push_str("\n⚠️ **No files to validate**\n");
        return out;
    }

    let (total, passed, failed) = match totals {
        Some(t) => (t.total_files, t.passed, t.failed),
        None => {
            let passed = results.iter().filter(|r| r.passed()).count();
            (results.len(), passed, results.len() - passed)
        }
    };
    let token_total: usize = results.iter().map(|r| r.token_count).sum();
    let line_total: usize = results.iter().map(|r| r.lines).sum();

    out.push_str("\n## Summary\n\n");
    out.push_str(&format!("- Files validated: {total}\n"));
    out.push_str(&format!("- Passed: {passed}\n"));
    out.push_str(&format!("- Failed: {failed}\n"));
    out.push_str(&format!("- Total tokens: {token_total}\n"));
    out.push_str(&format!("- Total lines: {line_total}\n"));

    out.push_str("\n## Performance Metrics\n\n");
    let times: Vec<f64> = results
        .iter()
        .filter_map(|r| r.tokenize_time_ms)
        .filter(|t| t.is_finite())
        .collect();

    if times.is_empty() {
        out.push_str("Percentile data unavailable, no timing data was recorded.\n");
    } else {
        let p50 = percentile(&times, 50.0).unwrap_or_default();
        let p95 = percentile(&times, 95.0).unwrap_or_default();
        let p99 = percentile(&times, 99.0).unwrap_or_default();
        let min = percentile(&times, 0.0).unwrap_or_default();
        let max = percentile(&times, 100.0).unwrap_or_default();
        let avg = times.iter().sum::<f64>() / times.len() as f64;

        out.push_str("| Metric | Tokenize time |\n");
        out.push_str("|--------|---------------|\n");
        out.push_str(&format!("| p50 | {p50:.2} ms |\n"));
        out.push_str(&format!("| p95 | {p95:.2} ms |\n"));
        out.push_str(&format!("| p99 | {p99:.2} ms |\n"));
        out.push_str(&format!("| min | {min:.2} ms |\n"));
        out.push_str(&format!("| max | {max:.2} ms |\n"));
        out.push_str(&format!("| avg | {avg:.2} ms |\n"));

        let threshold = OUTLIER_FACTOR * p95;
        let outliers: Vec<&FileResult> = results
            .iter()
            .filter(|r| r.tokenize_time_ms.map_or(false, |t| t > threshold))
            .collect();
        if !outliers.is_empty() {
            out.push_str("\n## Performance Outliers\n\n");
            for result in outliers {
                let time = result.tokenize_time_ms.unwrap_or_default();
                out.push_str(&format!(
                    "- `{}`, {time:.2} ms (p95 {p95:.2} ms)\n",
                    escape_markdown(&result.file)
                ));
            }
        }
    }

    let failures = collect_failures(results);
    if !failures.is_empty() {
        out.push_str("\n## Failures\n");
        for (category, entries) in failures {
            out.push_str(&format!("\n### {category}\n\n"));
            for entry in entries {
                out.push_str(&format!("- {entry}\n"));
            }
        }
    }

    out
}

/// Group failure lines by category, preserving first-seen order.
fn collect_failures(results: &[FileResult]) -> IndexMap<String, Vec<String>> {
    let mut failures: IndexMap<String, Vec<String>> = IndexMap::new();

    for result in results {
        let file = escape_markdown(&result.file);

        if !result.position_validation.is_valid {
            let bucket = failures
                .entry("position-validation".to_string())
                .or_default();
            for error in &result.position_validation.errors {
                bucket.push(format!("`{file}`: {}", escape_markdown(error)));
            }
        }

        for violation in &result.clean_exit.violations {
            let bucket = failures
                .entry(violation.category.as_str().to_string())
                .or_default();
            bucket.push(format!(
                "`{file}`: {} (expected {}, actual {})",
                escape_markdown(&violation.message),
                escape_markdown(&violation.expected),
                escape_markdown(&violation.actual)
            ));
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_lex::clean_exit::{CleanExitResult, Violation, ViolationCategory};
    use cal_lex::PositionValidation;

    fn passing_result(file: &str, ms: f64) -> FileResult {
        FileResult {
            file: file.to_string(),
            lines: 100,
            token_count: 500,
            tokenize_time_ms: Some(ms),
            position_validation: PositionValidation {
                is_valid: true,
                errors: Vec::new(),
                warnings: Vec::new(),
            },
            clean_exit: CleanExitResult::from_violations(Vec::new()),
        }
    }

    fn failing_result(file: &str) -> FileResult {
        let mut result = passing_result(file, 1.0);
        result.clean_exit = CleanExitResult::from_violations(vec![Violation {
            category: ViolationCategory::UnbalancedBrace,
            message: "brace depth nonzero after tokenization".to_string(),
            expected: "0".to_string(),
            actual: "1".to_string(),
        }]);
        result
    }

    #[test]
    fn test_empty_report() {
        let report = render_health_report(&[], None);
        assert!(report.starts_with("# C/AL Lexer Health Report"));
        assert!(report.contains("⚠️ **No files to validate**"));
        assert!(!report.contains("## Summary"));
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![passing_result("a.txt", 1.0), failing_result("b.txt")];
        let report = render_health_report(&results, None);
        assert!(report.contains("- Files validated: 2"));
        assert!(report.contains("- Passed: 1"));
        assert!(report.contains("- Failed: 1"));
    }

    #[test]
    fn test_totals_side_channel_overrides_counts() {
        // Only the failing result was retained; totals carry the real counts.
        let results = vec![failing_result("b.txt")];
        let totals = CorpusTotals {
            total_files: 250,
            passed: 249,
            failed: 1,
        };
        let report = render_health_report(&results, Some(&totals));
        assert!(report.contains("- Files validated: 250"));
        assert!(report.contains("- Passed: 249"));
    }

    #[test]
    fn test_percentiles_and_outlier() {
        // 99 files at 10 ms and one at 500 ms: p95 stays 10, so the slow
        // file exceeds twice the p95 and is flagged.
        let mut results: Vec<FileResult> = (0..99)
            .map(|i| passing_result(&format!("f{i}.txt"), 10.0))
            .collect();
        results.push(passing_result("slow.txt", 500.0));

        let report = render_health_report(&results, None);
        assert!(report.contains("| p95 | 10.00 ms |"));
        assert!(report.contains("## Performance Outliers"));
        assert!(report.contains("`slow.txt`, 500.00 ms"));
    }

    #[test]
    fn test_no_outlier_section_when_within_threshold() {
        let results = vec![passing_result("a.txt", 10.0), passing_result("b.txt", 12.0)];
        let report = render_health_report(&results, None);
        assert!(!report.contains("## Performance Outliers"));
    }

    #[test]
    fn test_percentile_data_unavailable() {
        let mut result = failing_result("b.txt");
        result.tokenize_time_ms = None;
        let report = render_health_report(&[result], None);
        assert!(report.contains("Percentile data unavailable"));
    }

    #[test]
    fn test_failures_grouped_by_category() {
        let results = vec![failing_result("b.txt"), failing_result("c.txt")];
        let report = render_health_report(&results, None);
        assert!(report.contains("## Failures"));
        assert!(report.contains("### unbalanced-brace"));
        assert!(report.contains("`b.txt`"));
        assert!(report.contains("`c.txt`"));
    }

    #[test]
    fn test_variable_text_is_markdown_escaped() {
        let mut result = failing_result("weird|name_[1].txt");
        result.position_validation = PositionValidation {
            is_valid: false,
            errors: vec!["token 3 (IDENT): value *mismatch*".to_string()],
            warnings: Vec::new(),
        };
        let report = render_health_report(&[result], None);
        assert!(report.contains("weird\\|name\\_\\[1\\].txt"));
        assert!(report.contains("\\*mismatch\\*"));
    }
}
