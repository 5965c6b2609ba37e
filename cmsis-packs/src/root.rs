//! Pack root layout
//!
//! Installed packs live under `<root>/<Vendor>/<Name>/<Version>/`, each with a
//! `<Vendor>.<Name>.pdsc`. Packs under development can be registered in
//! `<root>/.Local/local_repository.pidx` instead.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Document;
use tracing::debug;

use crate::error::{PackError, Result};
use crate::pdsc::child;
use crate::version;

/// Environment variable naming the pack root.
pub const PACK_ROOT_ENV: &str = "CMSIS_PACK_ROOT";

const LOCAL_REPOSITORY_INDEX: &str = ".Local/local_repository.pidx";

/// Where a pack description was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdscSource {
    Installed,
    Local,
}

/// A pack description file found under a pack root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdscLocation {
    pub path: PathBuf,
    /// Version implied by the directory layout or the local index
    pub version: Option<String>,
    pub source: PdscSource,
}

/// Get the default pack root (`<cache dir>/arm/packs`)
pub fn default_pack_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("arm")
        .join("packs")
}

/// Get the pack root from `CMSIS_PACK_ROOT`, if set and non-empty
pub fn pack_root_from_env() -> Option<PathBuf> {
    std::env::var_os(PACK_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// List installed `.pdsc` files in vendor/name/version order.
///
/// Vendors and names are walked by name, versions in ascending version order.
pub fn installed_pdsc_files(root: &Path) -> Result<Vec<PdscLocation>> {
    if !root.exists() {
        return Ok(vec![]);
    }

    let mut found = Vec::new();
    for (vendor, vendor_dir) in sorted_subdirs(root)? {
        for (name, name_dir) in sorted_subdirs(&vendor_dir)? {
            let mut versions = sorted_subdirs(&name_dir)?;
            versions.sort_by(|(a, _), (b, _)| version::compare(a, b));
            for (version, version_dir) in versions {
                let pdsc = version_dir.join(format!("{}.{}.pdsc", vendor, name));
                if pdsc.is_file() {
                    found.push(PdscLocation {
                        path: pdsc,
                        version: Some(version),
                        source: PdscSource::Installed,
                    });
                } else {
                    debug!(dir = %version_dir.display(), "no pack description in version directory");
                }
            }
        }
    }
    Ok(found)
}

/// List `.pdsc` files registered in the local repository index, in index order.
pub fn local_pdsc_files(root: &Path) -> Result<Vec<PdscLocation>> {
    let index = root.join(LOCAL_REPOSITORY_INDEX);
    if !index.exists() {
        return Ok(vec![]);
    }

    let text = fs::read_to_string(&index).map_err(|e| PackError::io(&index, e))?;
    let doc = Document::parse(&text).map_err(|source| PackError::Xml {
        path: index.clone(),
        source,
    })?;
    let pindex = child(doc.root_element(), "pindex").ok_or_else(|| PackError::MissingElement {
        path: index.clone(),
        element: "pindex".to_string(),
    })?;

    let mut found = Vec::new();
    for entry in pindex.children().filter(|n| n.has_tag_name("pdsc")) {
        let attr = |name: &str| {
            entry
                .attribute(name)
                .ok_or_else(|| PackError::MissingAttribute {
                    path: index.clone(),
                    element: "pdsc".to_string(),
                    attribute: name.to_string(),
                })
        };
        let vendor = attr("vendor")?;
        let name = attr("name")?;
        let url = attr("url")?;
        let dir = root.join(url_to_path(url));
        found.push(PdscLocation {
            path: dir.join(format!("{}.{}.pdsc", vendor, name)),
            version: entry.attribute("version").map(str::to_string),
            source: PdscSource::Local,
        });
    }
    Ok(found)
}

/// First `.pdsc` file (by name) in a pack directory.
pub fn find_pdsc_in(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PackError::io(dir, e))? {
        let path = entry.map_err(|e| PackError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "pdsc") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found.into_iter().next())
}

/// `file://localhost/home/me/pack/` -> `/home/me/pack/`
fn url_to_path(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("file://localhost")
        .or_else(|| url.strip_prefix("file://"))
        .unwrap_or(url);
    PathBuf::from(path)
}

/// Subdirectories sorted by name, skipping dot-directories (`.Web`, `.Local`, ...).
fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PackError::io(dir, e))? {
        let entry = entry.map_err(|e| PackError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| PackError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with('.') {
                dirs.push((name.to_string(), entry.path()));
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(root: &Path, vendor: &str, name: &str, version: &str) -> PathBuf {
        let dir = root.join(vendor).join(name).join(version);
        fs::create_dir_all(&dir).unwrap();
        let pdsc = dir.join(format!("{}.{}.pdsc", vendor, name));
        fs::write(&pdsc, "<package/>").unwrap();
        pdsc
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let found = installed_pdsc_files(&temp.path().join("nope")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_installed_packs_in_walk_order() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "Keil", "STM32F4xx_DFP", "2.15.0");
        install(temp.path(), "ARM", "CMSIS", "5.9.0");
        install(temp.path(), "ARM", "CMSIS", "5.8.0");
        fs::create_dir_all(temp.path().join(".Web")).unwrap();

        let found = installed_pdsc_files(temp.path()).unwrap();
        let versions: Vec<_> = found.iter().map(|l| l.version.clone().unwrap()).collect();
        assert_eq!(versions, vec!["5.8.0", "5.9.0", "2.15.0"]);
        assert!(found.iter().all(|l| l.source == PdscSource::Installed));
    }

    #[test]
    fn test_versions_walk_in_version_order() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "ARM", "CMSIS", "10.0.0");
        install(temp.path(), "ARM", "CMSIS", "9.0.0");
        install(temp.path(), "ARM", "CMSIS", "9.0.0-rc1");

        let found = installed_pdsc_files(temp.path()).unwrap();
        let versions: Vec<_> = found.iter().map(|l| l.version.clone().unwrap()).collect();
        assert_eq!(versions, vec!["9.0.0-rc1", "9.0.0", "10.0.0"]);
    }

    #[test]
    fn test_version_dir_without_pdsc_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("ARM/CMSIS/5.8.0")).unwrap();
        assert!(installed_pdsc_files(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_local_repository_index() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join(".Local");
        fs::create_dir_all(&local).unwrap();
        let pack_dir = temp.path().join("dev").join("MyPack");
        fs::write(
            local.join("local_repository.pidx"),
            format!(
                r#"<?xml version="1.0"?>
<index schemaVersion="1.1.0">
  <pindex>
    <pdsc vendor="LocalVendor" name="LocalPack" version="0.1.0" url="file://localhost{}/"/>
  </pindex>
</index>"#,
                pack_dir.display()
            ),
        )
        .unwrap();

        let found = local_pdsc_files(temp.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, pack_dir.join("LocalVendor.LocalPack.pdsc"));
        assert_eq!(found[0].version.as_deref(), Some("0.1.0"));
        assert_eq!(found[0].source, PdscSource::Local);
    }

    #[test]
    fn test_local_repository_without_pindex_is_error() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join(".Local");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("local_repository.pidx"), "<index/>").unwrap();
        assert!(local_pdsc_files(temp.path()).is_err());
    }

    #[test]
    fn test_find_pdsc_in_directory() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_pdsc_in(temp.path()).unwrap(), None);

        fs::write(temp.path().join("README.md"), "").unwrap();
        fs::write(temp.path().join("ARM.Local_DFP.pdsc"), "<package/>").unwrap();
        assert_eq!(
            find_pdsc_in(temp.path()).unwrap(),
            Some(temp.path().join("ARM.Local_DFP.pdsc"))
        );
    }

    #[test]
    fn test_url_to_path() {
        assert_eq!(url_to_path("file://localhost/opt/pack/"), PathBuf::from("/opt/pack/"));
        assert_eq!(url_to_path("file:///opt/pack/"), PathBuf::from("/opt/pack/"));
        assert_eq!(url_to_path("dev/pack"), PathBuf::from("dev/pack"));
    }
}
