//! Post-tokenization invariant checks.
//!
//! A tokenization run has a "clean exit" when every context it opened was
//! closed and every depth counter is back at zero. The check is a separate
//! pass over state the lexer accumulated; it never mutates the lexer and can
//! be invoked with different options against the same run.

use std::collections::BTreeSet;
use std::fmt;

/// Category of a clean-exit violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationCategory {
    /// The context stack did not end as `[NORMAL]`.
    StackMismatch,
    /// `{`/`}` counts differ.
    UnbalancedBrace,
    /// `(`/`)` counts differ.
    UnbalancedParen,
    /// `[`/`]` counts differ.
    UnbalancedBracket,
    /// A string literal or quoted identifier never terminated.
    UnterminatedLiteral,
    /// A report's RDLDATA section ran out of closing markers.
    RdldataUnderflow,
}

impl ViolationCategory {
    /// The stable kebab-case name used in reports and baselines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::StackMismatch => "stack-mismatch",
            ViolationCategory::UnbalancedBrace => "unbalanced-brace",
            ViolationCategory::UnbalancedParen => "unbalanced-paren",
            ViolationCategory::UnbalancedBracket => "unbalanced-bracket",
            ViolationCategory::UnterminatedLiteral => "unterminated-literal",
            ViolationCategory::RdldataUnderflow => "rdldata-underflow",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single clean-exit violation.
///
/// `expected`/`actual` describe the required and observed state; messages
/// never contain raw source content.
#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    /// Which invariant was broken.
    pub category: ViolationCategory,
    /// Human-readable description (already safe to surface).
    pub message: String,
    /// The state the invariant requires.
    pub expected: String,
    /// The state that was observed.
    pub actual: String,
}

/// Options for the clean-exit check.
#[derive(Clone, Copy, Debug, Default)]
pub struct CleanExitOptions {
    /// Suppress exactly the `rdldata-underflow` category. Report objects in
    /// the corpus carry RDLDATA sections with asymmetric markers, so the
    /// corpus driver enables this for `REP*` files.
    pub allow_rdldata_underflow: bool,
}

/// The verdict of a clean-exit check.
#[derive(Clone, Debug)]
pub struct CleanExitResult {
    /// True when no violations remain after option filtering.
    pub passed: bool,
    /// The violations, in the order they were detected.
    pub violations: Vec<Violation>,
    /// The distinct categories present in `violations`.
    pub categories: BTreeSet<ViolationCategory>,
}

impl CleanExitResult {
    /// Build a result from a violation list, deriving `passed` and the
    /// category set.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let categories = violations.iter().map(|v| v.category).collect();
        Self {
            passed: violations.is_empty(),
            violations,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(category: ViolationCategory) -> Violation {
        Violation {
            category,
            message: "test".to_string(),
            expected: "0".to_string(),
            actual: "1".to_string(),
        }
    }

    #[test]
    fn test_category_names() {
        assert_eq!(ViolationCategory::StackMismatch.as_str(), "stack-mismatch");
        assert_eq!(
            ViolationCategory::RdldataUnderflow.to_string(),
            "rdldata-underflow"
        );
    }

    #[test]
    fn test_result_from_empty_is_passed() {
        let result = CleanExitResult::from_violations(Vec::new());
        assert!(result.passed);
        assert!(result.categories.is_empty());
    }

    #[test]
    fn test_result_collects_distinct_categories() {
        let result = CleanExitResult::from_violations(vec![
            violation(ViolationCategory::UnbalancedBrace),
            violation(ViolationCategory::UnbalancedBrace),
            violation(ViolationCategory::StackMismatch),
        ]);
        assert!(!result.passed);
        assert_eq!(result.violations.len(), 3);
        assert_eq!(result.categories.len(), 2);
        assert!(result.categories.contains(&ViolationCategory::StackMismatch));
    }
}
