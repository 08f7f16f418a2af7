//! Error handling for the calt CLI.

use thiserror::Error;

/// Main error type for the calt CLI.
#[derive(Debug, Error)]
pub enum CaltError {
    /// A configuration input (baseline file, corpus root) is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO failure while reading corpus files or writing reports.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a baseline or package file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the CLI.
pub type Result<T> = std::result::Result<T, CaltError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CaltError::Config("baseline missing maxFailures".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: baseline missing maxFailures"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CaltError = io.into();
        assert!(matches!(err, CaltError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: CaltError = json.into();
        assert!(matches!(err, CaltError::Json(_)));
    }
}
