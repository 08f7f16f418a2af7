//! Cross-project version check.
//!
//! The editor extension that ships this toolchain keeps its version in a
//! top-level `package.json`; the corpus baseline records the toolchain
//! version it was measured against. When the two drift apart the check
//! produces a structured warning, a multi-line human message for stderr,
//! or a single-line `::warning::` annotation for CI log parsers. Anything
//! missing (file, JSON, version field) makes the check a silent no-op.

use std::fs;
use std::path::Path;

/// Where a warning should be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// A version-mismatch warning and its destination stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionWarning {
    pub output: String,
    pub stream: Stream,
}

fn read_version(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&text).ok()?;
    json.get("version")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

/// Compare the `version` fields of `package.json` and the baseline JSON.
///
/// Returns `None` when the versions match or when any input is missing.
pub fn check_version_match(
    package_json: &Path,
    baseline_json: &Path,
    annotate: bool,
) -> Option<VersionWarning> {
    let package_version = read_version(package_json)?;
    let baseline_version = read_version(baseline_json)?;

    if package_version == baseline_version {
        return None;
    }

    if annotate {
        Some(VersionWarning {
            output: format!(
                "::warning::version mismatch: package.json has {package_version}, baseline has {baseline_version}"
            ),
            stream: Stream::Stdout,
        })
    } else {
        Some(VersionWarning {
            output: format!(
                "WARNING: version mismatch detected\n  package.json: {package_version}\n  baseline:     {baseline_version}\nRe-run the corpus validation and update the baseline after releasing."
            ),
            stream: Stream::Stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::write(path, content).expect("write");
    }

    #[test]
    fn test_matching_versions_are_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = dir.path().join("package.json");
        let baseline = dir.path().join("baseline.json");
        write(&package, r#"{"version": "1.2.3"}"#);
        write(&baseline, r#"{"maxFailures": 0, "version": "1.2.3"}"#);
        assert_eq!(check_version_match(&package, &baseline, false), None);
    }

    #[test]
    fn test_mismatch_human_warning_goes_to_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = dir.path().join("package.json");
        let baseline = dir.path().join("baseline.json");
        write(&package, r#"{"version": "1.3.0"}"#);
        write(&baseline, r#"{"version": "1.2.3"}"#);

        let warning = check_version_match(&package, &baseline, false).expect("warning");
        assert_eq!(warning.stream, Stream::Stderr);
        assert!(warning.output.contains("1.3.0"));
        assert!(warning.output.contains("1.2.3"));
        assert!(warning.output.lines().count() > 1);
    }

    #[test]
    fn test_mismatch_annotation_goes_to_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = dir.path().join("package.json");
        let baseline = dir.path().join("baseline.json");
        write(&package, r#"{"version": "1.3.0"}"#);
        write(&baseline, r#"{"version": "1.2.3"}"#);

        let warning = check_version_match(&package, &baseline, true).expect("warning");
        assert_eq!(warning.stream, Stream::Stdout);
        assert!(warning.output.starts_with("::warning::"));
        assert_eq!(warning.output.lines().count(), 1);
    }

    #[test]
    fn test_missing_inputs_are_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let package = dir.path().join("package.json");
        let baseline = dir.path().join("baseline.json");

        // Missing both files.
        assert_eq!(check_version_match(&package, &baseline, false), None);

        // Unparseable package.json.
        write(&package, "not json at all");
        write(&baseline, r#"{"version": "1.0.0"}"#);
        assert_eq!(check_version_match(&package, &baseline, false), None);

        // Missing version field.
        write(&package, r#"{"name": "cal-tools"}"#);
        assert_eq!(check_version_match(&package, &baseline, false), None);

        // Non-string version field.
        write(&package, r#"{"version": 2}"#);
        assert_eq!(check_version_match(&package, &baseline, false), None);
    }
}
