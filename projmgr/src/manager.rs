//! Process-wide entry point
//!
//! The [`Manager`] owns the installed pack inventory and the validation
//! settings. [`Worker`] and [`Parser`] are cheap views borrowing it.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use cmsis_packs::PackIndex;
use tracing::{debug, info, warn};

use crate::config::{Config, ValidateConfig};
use crate::error::Result;
use crate::parser::Parser;
use crate::worker::Worker;

pub struct Manager {
    pack_root: Option<PathBuf>,
    index: RwLock<PackIndex>,
    settings: ValidateConfig,
}

impl Manager {
    /// Load the packs installed under `pack_root`.
    pub fn new(pack_root: &Path) -> Result<Self> {
        let index = PackIndex::load(pack_root)?;
        if index.is_empty() {
            warn!(root = %pack_root.display(), "no packs installed under pack root");
        } else {
            info!(
                root = %pack_root.display(),
                packs = index.packs().len(),
                "loaded pack inventory"
            );
        }
        Ok(Self {
            pack_root: Some(pack_root.to_path_buf()),
            index: RwLock::new(index),
            settings: ValidateConfig::default(),
        })
    }

    /// Build a manager from configuration, with an optional pack root override.
    pub fn from_config(config: &Config, pack_root: Option<&Path>) -> Result<Self> {
        let root = config.pack_root(pack_root);
        Ok(Self::new(&root)?.with_settings(config.validate))
    }

    /// Build a manager over an in-memory inventory.
    pub fn from_index(index: PackIndex) -> Self {
        Self {
            pack_root: index.root().map(Path::to_path_buf),
            index: RwLock::new(index),
            settings: ValidateConfig::default(),
        }
    }

    pub fn with_settings(mut self, settings: ValidateConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> ValidateConfig {
        self.settings
    }

    pub fn pack_root(&self) -> Option<&Path> {
        self.pack_root.as_deref()
    }

    /// Re-read the pack root.
    ///
    /// The new inventory is built before the write lock is taken, so queries
    /// running concurrently see either the old or the new inventory. On error
    /// the current inventory is kept. Managers built from an in-memory index
    /// have nothing to reload.
    pub fn reload(&self) -> Result<()> {
        let Some(root) = &self.pack_root else {
            debug!("no pack root to reload");
            return Ok(());
        };
        let index = PackIndex::load(root)?;
        info!(root = %root.display(), packs = index.packs().len(), "reloaded pack inventory");
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        Ok(())
    }

    pub fn worker(&self) -> Worker<'_> {
        Worker::new(self)
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self)
    }

    pub(crate) fn index(&self) -> RwLockReadGuard<'_, PackIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }
}
