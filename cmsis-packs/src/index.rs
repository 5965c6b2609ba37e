//! Inventory of installed packs

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::pack::{Component, Device, Pack};
use crate::pdsc::read_pdsc;
use crate::reference::PackRef;
use crate::root::{installed_pdsc_files, local_pdsc_files};

/// A pack description that could not be read.
#[derive(Debug, Clone)]
pub struct SkippedPack {
    pub pdsc: PathBuf,
    pub reason: String,
}

/// All packs known to the tool, in discovery order.
///
/// Discovery order is installed packs (vendor/name/version directory walk)
/// followed by local repository packs in index order.
#[derive(Debug, Clone, Default)]
pub struct PackIndex {
    root: Option<PathBuf>,
    packs: Vec<Pack>,
    skipped: Vec<SkippedPack>,
}

impl PackIndex {
    /// Build an index from packs already in memory.
    pub fn from_packs(packs: Vec<Pack>) -> Self {
        Self {
            root: None,
            packs,
            skipped: Vec::new(),
        }
    }

    /// Load every pack under a pack root.
    ///
    /// A missing root gives an empty index. Unreadable directories or a
    /// malformed local repository index are errors; individual pack
    /// descriptions that fail to parse are skipped and recorded.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.exists() {
            warn!(root = %root.display(), "pack root does not exist");
        }

        let mut locations = installed_pdsc_files(root)?;
        locations.extend(local_pdsc_files(root)?);

        let mut index = Self {
            root: Some(root.to_path_buf()),
            ..Self::default()
        };
        for location in locations {
            match read_pdsc(&location.path, location.version.as_deref()) {
                Ok(pack) => {
                    debug!(pack = %pack.id, source = ?location.source, "loaded pack");
                    index.packs.push(pack);
                }
                Err(e) => {
                    warn!(pdsc = %location.path.display(), error = %e, "skipping pack");
                    index.skipped.push(SkippedPack {
                        pdsc: location.path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        debug!(
            packs = index.packs.len(),
            skipped = index.skipped.len(),
            "pack index loaded"
        );
        Ok(index)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn skipped(&self) -> &[SkippedPack] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.packs.iter().flat_map(|p| p.devices.iter())
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.packs.iter().flat_map(|p| p.components.iter())
    }

    /// Packs matching a reference, in discovery order.
    pub fn find_packs<'a>(&'a self, reference: &'a PackRef) -> impl Iterator<Item = &'a Pack> {
        self.packs.iter().filter(move |p| reference.matches(&p.id))
    }

    /// Packs selected by a list of references; all packs when the list is empty.
    pub fn select(&self, references: &[PackRef]) -> Vec<&Pack> {
        if references.is_empty() {
            return self.packs.iter().collect();
        }
        self.packs
            .iter()
            .filter(|p| references.iter().any(|r| r.matches(&p.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::PackId;
    use std::fs;
    use tempfile::TempDir;

    fn write_pack(root: &Path, vendor: &str, name: &str, version: &str, devices: &str) {
        let dir = root.join(vendor).join(name).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{}.{}.pdsc", vendor, name)),
            format!(
                r#"<package>
  <vendor>{vendor}</vendor>
  <name>{name}</name>
  <releases><release version="{version}"/></releases>
  <devices>{devices}</devices>
</package>"#
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_load_fixture_root() {
        let temp = TempDir::new().unwrap();
        write_pack(temp.path(), "ARM", "CMSIS", "5.8.0", "");
        write_pack(
            temp.path(),
            "ARM",
            "RteTest_DFP",
            "0.2.0",
            r#"<family Dfamily="F" Dvendor="ARM:82"><processor Dcore="Cortex-M3"/><device Dname="ARMCM3"/></family>"#,
        );

        let index = PackIndex::load(temp.path()).unwrap();
        let ids: Vec<String> = index.packs().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["ARM::CMSIS@5.8.0", "ARM::RteTest_DFP@0.2.0"]);
        assert_eq!(index.devices().count(), 1);
        assert_eq!(index.root(), Some(temp.path()));
    }

    #[test]
    fn test_malformed_pdsc_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_pack(temp.path(), "ARM", "CMSIS", "5.8.0", "");
        let bad = temp.path().join("Bad/Pack/1.0.0");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("Bad.Pack.pdsc"), "<package>").unwrap();

        let index = PackIndex::load(temp.path()).unwrap();
        assert_eq!(index.packs().len(), 1);
        assert_eq!(index.skipped().len(), 1);
        assert!(index.skipped()[0].pdsc.ends_with("Bad.Pack.pdsc"));
    }

    #[test]
    fn test_missing_root_gives_empty_index() {
        let temp = TempDir::new().unwrap();
        let index = PackIndex::load(&temp.path().join("missing")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_select_by_reference() {
        let index = PackIndex::from_packs(vec![
            Pack::new(PackId::new("ARM", "CMSIS", "5.8.0")),
            Pack::new(PackId::new("ARM", "CMSIS", "5.9.0")),
            Pack::new(PackId::new("Keil", "STM32F4xx_DFP", "2.15.0")),
        ]);

        assert_eq!(index.select(&[]).len(), 3);

        let refs = vec![PackRef::parse("ARM::CMSIS@>=5.9.0").unwrap()];
        let selected = index.select(&refs);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id.version, "5.9.0");

        let any_cmsis = PackRef::parse("ARM::CMSIS").unwrap();
        assert_eq!(index.find_packs(&any_cmsis).count(), 2);
    }
}
