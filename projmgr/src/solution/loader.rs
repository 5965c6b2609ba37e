//! Solution file loader

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{ProjMgrError, Result};
use crate::validation::{Location, ValidationIssue};

/// A YAML file read from disk, kept as text for locating entries.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub text: String,
}

impl Source {
    /// Read a file, mapping a missing file to [`ProjMgrError::NotFound`].
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ProjMgrError::NotFound(path.to_path_buf()),
            _ => ProjMgrError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Deserialize the document, reporting syntax and schema problems as an issue.
    pub fn parse<T: DeserializeOwned>(&self) -> std::result::Result<T, ValidationIssue> {
        serde_yaml::from_str(&self.text).map_err(|e| {
            let location = e.location().map(|l| Location {
                line: l.line(),
                column: l.column(),
            });
            ValidationIssue::new(&self.path, location, "schema", &e.to_string())
        })
    }

    /// Find the first `key: value` entry in the text.
    ///
    /// Matches plain and list-item entries (`- key: value`), with the value
    /// optionally quoted. The column points at the key.
    pub fn locate(&self, key: &str, value: &str) -> Option<Location> {
        self.text.lines().enumerate().find_map(|(index, line)| {
            let start = line.len() - line.trim_start().len();
            let mut entry = &line[start..];
            let mut column = start;
            if let Some(item) = entry.strip_prefix("- ") {
                let trimmed = item.trim_start();
                column += entry.len() - trimmed.len();
                entry = trimmed;
            }
            let rest = entry.strip_prefix(key)?.strip_prefix(':')?;
            let found = strip_comment(rest).trim().trim_matches(|c| c == '"' || c == '\'');
            (found == value).then_some(Location {
                line: index + 1,
                column: column + 1,
            })
        })
    }

    /// Find the first `key:` entry, whatever its value.
    pub fn locate_key(&self, key: &str) -> Option<Location> {
        self.text.lines().enumerate().find_map(|(index, line)| {
            let trimmed = line.trim_start().trim_start_matches("- ").trim_start();
            let rest = trimmed.strip_prefix(key)?;
            rest.starts_with(':').then_some(Location {
                line: index + 1,
                column: line.len() - trimmed.len() + 1,
            })
        })
    }

    /// Directory that relative paths in this file are resolved against.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Drop a trailing ` # comment`.
fn strip_comment(value: &str) -> &str {
    match value.find(" #") {
        Some(index) => &value[..index],
        None => value,
    }
}
