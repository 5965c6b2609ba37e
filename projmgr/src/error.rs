use std::path::PathBuf;

use cmsis_packs::PackError;
use thiserror::Error;

/// Error types for projmgr operations.
///
/// Only input-level failures are errors. Problems found inside a solution
/// are reported through [`crate::validation::ValidationResult`].
#[derive(Error, Debug)]
pub enum ProjMgrError {
    #[error("No solution file given")]
    EmptyPath,

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load installed packs: {0}")]
    Pack(#[from] PackError),

    #[error("Invalid project {}: {message}", path.display())]
    InvalidProject { path: PathBuf, message: String },

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ProjMgrError>;
