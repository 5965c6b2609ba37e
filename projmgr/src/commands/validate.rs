//! Validate command implementation

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::OutputFormat;
use crate::error::ProjMgrError;
use crate::manager::Manager;
use crate::validation::{ValidationIssue, ValidationResult};

/// Exit code for a solution with errors.
pub const EXIT_INVALID: i32 = 1;
/// Exit code when the solution could not be read at all.
pub const EXIT_INPUT: i32 = 2;

/// Run the validate command.
pub fn run(manager: &Manager, path: &Path, format: OutputFormat) -> Result<i32> {
    let result = match manager.parser().validate_solution(path) {
        Ok(result) => result,
        Err(e @ (ProjMgrError::EmptyPath | ProjMgrError::NotFound(_) | ProjMgrError::Io { .. })) => {
            eprintln!("error projmgr: {}", e);
            return Ok(EXIT_INPUT);
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => {
            let report = json!({
                "path": path.display().to_string(),
                "valid": result.is_valid(),
                "errors": result.errors,
                "warnings": result.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(path, &result),
    }

    Ok(if result.is_valid() { 0 } else { EXIT_INVALID })
}

fn print_text(path: &Path, result: &ValidationResult) {
    for error in &result.errors {
        eprintln!("{}", diagnostic(error, "error"));
    }
    for warning in &result.warnings {
        eprintln!("{}", diagnostic(warning, "warning"));
    }

    if result.is_valid() {
        println!("{} was parsed successfully", path.display());
    } else {
        eprintln!(
            "{} validation failed: {} errors, {} warnings",
            path.display(),
            result.errors.len(),
            result.warnings.len()
        );
    }
}

/// `file:line:col - error projmgr: message`
pub fn diagnostic(issue: &ValidationIssue, severity: &str) -> String {
    format!("{} - {} projmgr: {}", issue.position(), severity, issue.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Location;

    #[test]
    fn test_diagnostic_format() {
        let issue = ValidationIssue::new(
            Path::new("hello.csolution.yml"),
            Some(Location { line: 7, column: 15 }),
            "device",
            "specified device 'Foo' was not found among the installed packs",
        );
        assert_eq!(
            diagnostic(&issue, "error"),
            "hello.csolution.yml:7:15 - error projmgr: specified device 'Foo' was not found among the installed packs"
        );
    }

    #[test]
    fn test_diagnostic_without_location() {
        let issue = ValidationIssue::new(Path::new("hello.yml"), None, "file", "bad name");
        assert_eq!(diagnostic(&issue, "warning"), "hello.yml - warning projmgr: bad name");
    }
}
