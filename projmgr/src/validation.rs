//! Validation results for solution, project and layer files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A position in a source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A validation error or warning.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Path to the file with the issue
    pub path: PathBuf,
    /// Position of the offending entry, when known
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// Key or section the issue refers to
    pub field: String,
    /// Description of the issue
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: &Path, location: Option<Location>, field: &str, message: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            line: location.map(|l| l.line),
            column: location.map(|l| l.column),
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// `file:line:col` or just `file` when the location is unknown.
    pub fn position(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{}:{}:{}", self.path.display(), line, column),
            (Some(line), None) => format!("{}:{}", self.path.display(), line),
            _ => self.path.display().to_string(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.position(), self.message)
    }
}

/// Result of validating a solution and the files it references.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    /// Errors that make the solution invalid
    pub errors: Vec<ValidationIssue>,
    /// Warnings that indicate potential issues
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, path: &Path, location: Option<Location>, field: &str, message: &str) {
        self.errors
            .push(ValidationIssue::new(path, location, field, message));
    }

    pub fn add_warning(
        &mut self,
        path: &Path,
        location: Option<Location>,
        field: &str,
        message: &str,
    ) {
        self.warnings
            .push(ValidationIssue::new(path, location, field, message));
    }

    /// Turn every warning into an error.
    pub fn promote_warnings(&mut self) {
        self.errors.append(&mut self.warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut result = ValidationResult::new();
        result.add_warning(Path::new("a.csolution.yml"), None, "board", "no board");
        assert!(result.is_valid());

        result.promote_warnings();
        assert!(!result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_issue_display_with_location() {
        let issue = ValidationIssue::new(
            Path::new("hello.csolution.yml"),
            Some(Location { line: 4, column: 15 }),
            "device",
            "specified device 'Foo' was not found among the installed packs",
        );
        assert_eq!(
            issue.to_string(),
            "hello.csolution.yml:4:15 - specified device 'Foo' was not found among the installed packs"
        );
    }

    #[test]
    fn test_issue_display_without_location() {
        let issue = ValidationIssue::new(Path::new("hello.csolution.yml"), None, "file", "bad");
        assert_eq!(issue.to_string(), "hello.csolution.yml - bad");
    }
}
