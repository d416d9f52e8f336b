//! Error types for dispatchboard-core
//!
//! Provides a typed error hierarchy with thiserror plus a load report for
//! graceful degradation when a dataset is only partially readable.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dispatchboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Filter Errors
    // ===================
    #[error("Unknown filter type: {name}")]
    UnknownFilterType { name: String },

    #[error("Malformed date range '{value}': {reason}")]
    MalformedDateRange { value: String, reason: String },

    #[error("Date range start {start} is after end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Date range spans {span_days} days, limit is {max_days}")]
    DateRangeTooLong { span_days: i64, max_days: i64 },

    // ===================
    // Drill-down Errors
    // ===================
    #[error("Unknown granularity: {name}")]
    UnknownGranularity { name: String },

    #[error("Unknown chart kind: {name}")]
    UnknownChartKind { name: String },
}

impl CoreError {
    pub(crate) fn malformed_date_range(value: &str, reason: impl Into<String>) -> Self {
        CoreError::MalformedDateRange {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, the entry was skipped
    Warning,
    /// Significant but not fatal
    Error,
    /// Cannot continue
    Fatal,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    /// Add an actionable suggestion to this error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion, severity) = match error {
            CoreError::FileNotFound { path } => (
                format!("File not found: {}", path.display()),
                Some(format!("Check if file exists: ls {}", path.display())),
                ErrorSeverity::Fatal,
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
                ErrorSeverity::Fatal,
            ),
            CoreError::JsonParse { path, message, .. } => (
                format!("Invalid JSON in {}: {}", path.display(), message),
                Some("Validate JSON syntax with: jq . <file>".to_string()),
                ErrorSeverity::Fatal,
            ),
            CoreError::MalformedDateRange { .. } | CoreError::InvalidDateRange { .. } => (
                error.to_string(),
                Some("Use the form YYYY-MM-DD_YYYY-MM-DD with start <= end".to_string()),
                ErrorSeverity::Error,
            ),
            CoreError::DateRangeTooLong { max_days, .. } => (
                error.to_string(),
                Some(format!(
                    "Pick a range of at most {} days or raise max_date_range_days",
                    max_days
                )),
                ErrorSeverity::Error,
            ),
            _ => (error.to_string(), None, ErrorSeverity::Error),
        };

        Self {
            source,
            message,
            severity,
            suggestion,
        }
    }
}

/// Report of problems encountered while loading a dataset
///
/// Enables graceful degradation by tracking skipped records
/// instead of failing completely on any malformed entry.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub records_loaded: usize,
    pub records_skipped: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    /// Returns true if there are any fatal errors
    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns only warnings
    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns count by severity
    pub fn error_count(&self) -> (usize, usize, usize) {
        let count = |severity: ErrorSeverity| {
            self.errors
                .iter()
                .filter(|e| e.severity == severity)
                .count()
        };
        (
            count(ErrorSeverity::Warning),
            count(ErrorSeverity::Error),
            count(ErrorSeverity::Fatal),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_severity_counting() {
        let mut report = LoadReport::new();
        report.add_warning("record[3]", "missing field `date`");
        report.add_error(LoadError::from_core_error(
            "filter",
            &CoreError::malformed_date_range("2024-01-01", "missing end date"),
        ));
        report.add_error(LoadError::from_core_error(
            "dataset",
            &CoreError::FileNotFound {
                path: PathBuf::from("/tmp/none.json"),
            },
        ));

        let (warnings, errors, fatal) = report.error_count();
        assert_eq!(warnings, 1);
        assert_eq!(errors, 1);
        assert_eq!(fatal, 1);
        assert!(report.has_fatal_errors());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_from_core_error_suggests_date_format() {
        let err = CoreError::malformed_date_range("2024-01-01", "missing end date");
        let load_error = LoadError::from_core_error("filter", &err);

        assert_eq!(load_error.severity, ErrorSeverity::Error);
        assert!(load_error.message.contains("2024-01-01"));
        assert!(load_error.suggestion.unwrap().contains("YYYY-MM-DD_YYYY-MM-DD"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = CoreError::FileNotFound {
            path: PathBuf::from("/tmp/none.json"),
        };
        let load_error = LoadError::from_core_error("dataset", &err);
        assert_eq!(load_error.severity, ErrorSeverity::Fatal);
    }
}
