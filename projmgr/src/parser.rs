//! Solution validation

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ProjMgrError, Result};
use crate::manager::Manager;
use crate::solution::{check_solution, Source};
use crate::validation::ValidationResult;

/// Validates solution files against the manager's inventory.
///
/// Every call reads the file again; nothing is cached between calls.
#[derive(Clone, Copy)]
pub struct Parser<'a> {
    manager: &'a Manager,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(manager: &'a Manager) -> Self {
        Self { manager }
    }

    /// Returns true if the solution was read and has no errors.
    ///
    /// Empty and nonexistent paths give false.
    pub fn parse_solution(&self, path: &str) -> bool {
        match self.validate_solution(Path::new(path)) {
            Ok(result) => result.is_valid(),
            Err(e) => {
                debug!(path, error = %e, "solution not validated");
                false
            }
        }
    }

    /// Validate a solution and the projects and layers it references.
    ///
    /// Only input-level failures are errors; problems inside the files are
    /// reported in the returned [`ValidationResult`].
    pub fn validate_solution(&self, path: &Path) -> Result<ValidationResult> {
        if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
            return Err(ProjMgrError::EmptyPath);
        }
        if path.is_dir() {
            return Err(ProjMgrError::NotFound(path.to_path_buf()));
        }
        let source = Source::read(path)?;

        let index = self.manager.index();
        let result = check_solution(&index, self.manager.settings(), &source);
        info!(
            path = %path.display(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated solution"
        );
        Ok(result)
    }
}
