//! Configuration file support for projmgr
//!
//! Settings come from `<config dir>/projmgr/config.toml`. The pack root is
//! layered: command line, then `CMSIS_PACK_ROOT`, then the file, then the
//! default location.

use std::fs;
use std::path::{Path, PathBuf};

use cmsis_packs::root::{default_pack_root, pack_root_from_env};
use serde::{Deserialize, Serialize};

use crate::error::{ProjMgrError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pack root used when neither `--pack-root` nor `CMSIS_PACK_ROOT` is set
    pub pack_root: Option<PathBuf>,
    pub list: ListConfig,
    pub validate: ValidateConfig,
}

/// Defaults for `projmgr list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Architecture filter applied when none is given
    pub architecture: String,
}

/// Validation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Warn about group files that do not exist
    pub check_files: bool,
    /// Treat warnings as errors
    pub warnings_as_errors: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            architecture: "ARM".to_string(),
        }
    }
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            check_files: true,
            warnings_as_errors: false,
        }
    }
}

impl Config {
    /// Returns the path to the configuration file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("projmgr").join("config.toml"))
    }

    /// Load configuration, falling back to defaults if the file is missing.
    ///
    /// An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ProjMgrError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ProjMgrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ProjMgrError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the pack root: explicit override, environment, file, default.
    pub fn pack_root(&self, explicit: Option<&Path>) -> PathBuf {
        self.resolve_pack_root(explicit, pack_root_from_env())
    }

    fn resolve_pack_root(&self, explicit: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| self.pack_root.clone())
            .unwrap_or_else(default_pack_root)
    }
}
