//! Inventory queries

use std::path::Path;

use cmsis_packs::{Filter, Pack};
use tracing::debug;

use crate::error::{ProjMgrError, Result};
use crate::manager::Manager;
use crate::solution::{select_project_packs, ProjectFile, Source};

/// Answers pack, device and component queries against the manager's inventory.
///
/// Inventory queries never fail: an unmatched filter gives an empty list.
/// Results keep discovery order and are not deduplicated. Project-scoped
/// queries fail when the project cannot be read or its pack and device
/// references do not resolve.
#[derive(Clone, Copy)]
pub struct Worker<'a> {
    manager: &'a Manager,
}

impl<'a> Worker<'a> {
    pub(crate) fn new(manager: &'a Manager) -> Self {
        Self { manager }
    }

    /// Pack identifiers (`Vendor::Name@Version`) matching the filter.
    pub fn list_packs(&self, architecture: &str) -> Vec<String> {
        let filter = Filter::new(architecture);
        self.manager
            .index()
            .packs()
            .iter()
            .map(|pack| pack.id.to_string())
            .filter(|id| filter.matches(id))
            .collect()
    }

    /// Device identifiers matching the filter by identifier or processor core.
    pub fn list_devices(&self, architecture: &str) -> Vec<String> {
        device_ids(self.manager.index().packs(), &Filter::new(architecture))
    }

    /// Component identifiers matching the filter.
    pub fn list_components(&self, filter: &str) -> Vec<String> {
        component_ids(self.manager.index().packs(), &Filter::new(filter))
    }

    /// Like [`Worker::list_devices`], limited to the packs a project selects.
    pub fn list_project_devices(&self, project: &Path, architecture: &str) -> Result<Vec<String>> {
        let packs = self.project_packs(project)?;
        Ok(device_ids(&packs, &Filter::new(architecture)))
    }

    /// Like [`Worker::list_components`], limited to the packs a project selects.
    pub fn list_project_components(&self, project: &Path, filter: &str) -> Result<Vec<String>> {
        let packs = self.project_packs(project)?;
        Ok(component_ids(&packs, &Filter::new(filter)))
    }

    fn project_packs(&self, path: &Path) -> Result<Vec<Pack>> {
        let source = Source::read(path)?;
        let project = source
            .parse::<ProjectFile>()
            .map_err(|issue| ProjMgrError::InvalidProject {
                path: path.to_path_buf(),
                message: issue.to_string(),
            })?
            .project;

        let index = self.manager.index();
        let (packs, result) = select_project_packs(&index, &source, &project);
        if !result.is_valid() {
            let messages: Vec<String> = result.errors.into_iter().map(|e| e.message).collect();
            return Err(ProjMgrError::InvalidProject {
                path: path.to_path_buf(),
                message: messages.join("; "),
            });
        }
        debug!(project = %path.display(), packs = packs.len(), "selected project packs");
        Ok(packs)
    }
}

fn device_ids<'p>(packs: impl IntoIterator<Item = &'p Pack>, filter: &Filter) -> Vec<String> {
    packs
        .into_iter()
        .flat_map(|pack| &pack.devices)
        .filter_map(|device| {
            let id = device.id();
            let core = device.core.as_deref().unwrap_or("");
            let matched = filter.matches_any(&[id.as_str(), core]);
            matched.then_some(id)
        })
        .collect()
}

fn component_ids<'p>(packs: impl IntoIterator<Item = &'p Pack>, filter: &Filter) -> Vec<String> {
    packs
        .into_iter()
        .flat_map(|pack| &pack.components)
        .map(|component| component.id())
        .filter(|id| filter.matches(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsis_packs::{PackId, PackIndex};
    use std::fs;
    use tempfile::TempDir;

    fn manager() -> Manager {
        Manager::from_index(PackIndex::from_packs(vec![
            Pack::new(PackId::new("ARM", "CMSIS", "5.8.0"))
                .with_component("CMSIS", "CORE", None)
                .with_component("CMSIS", "RTOS2", Some("Keil RTX5")),
            Pack::new(PackId::new("Keil", "STM32F4xx_DFP", "2.15.0"))
                .with_device("STM32F407VG", "Cortex-M4")
                .with_device("STM32F401RE", "Cortex-M4"),
            Pack::new(PackId::new("ARM", "V2M_MPS2_DFP", "1.0.0"))
                .with_device("ARMCM3", "Cortex-M3")
                .with_device("ARMCM4", "Cortex-M4"),
            Pack::new(PackId::new("ARM", "V2M_MPS2_DFP", "1.1.0")).with_device("ARMCM3", "Cortex-M3"),
        ]))
    }

    #[test]
    fn test_list_packs_by_architecture() {
        let manager = manager();
        let worker = manager.worker();
        assert_eq!(
            worker.list_packs("ARM"),
            vec![
                "ARM::CMSIS@5.8.0",
                "ARM::V2M_MPS2_DFP@1.0.0",
                "ARM::V2M_MPS2_DFP@1.1.0"
            ]
        );
        assert!(worker.list_packs("RISC-V").is_empty());
    }

    #[test]
    fn test_empty_filter_lists_everything_in_discovery_order() {
        let manager = manager();
        assert_eq!(
            manager.worker().list_packs(""),
            vec![
                "ARM::CMSIS@5.8.0",
                "Keil::STM32F4xx_DFP@2.15.0",
                "ARM::V2M_MPS2_DFP@1.0.0",
                "ARM::V2M_MPS2_DFP@1.1.0"
            ]
        );
    }

    #[test]
    fn test_devices_match_by_core_and_keep_duplicates() {
        let manager = manager();
        let worker = manager.worker();
        assert_eq!(
            worker.list_devices("Cortex-M4"),
            vec!["Keil::STM32F407VG", "Keil::STM32F401RE", "ARM::ARMCM4"]
        );
        assert_eq!(
            worker.list_devices("ARM Cortex-M3"),
            vec!["ARM::ARMCM3", "ARM::ARMCM3"]
        );
    }

    #[test]
    fn test_packs_and_devices_are_independent() {
        let manager = manager();
        let worker = manager.worker();
        let devices_before = worker.list_devices("ARM");
        assert!(worker.list_packs("Keil").len() == 1);
        assert_eq!(worker.list_devices("ARM"), devices_before);
        assert_eq!(
            worker.list_packs("ARM").len(),
            3,
            "device queries must not affect pack queries"
        );
    }

    #[test]
    fn test_list_components() {
        let manager = manager();
        assert_eq!(
            manager.worker().list_components("RTOS2"),
            vec!["ARM::CMSIS:RTOS2:Keil RTX5@5.8.0"]
        );
        assert_eq!(manager.worker().list_components("").len(), 2);
    }

    #[test]
    fn test_project_limits_devices_to_its_packs() {
        let manager = manager();
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("app.cproject.yml");
        fs::write(
            &project,
            "project:\n  packs:\n    - pack: ARM::V2M_MPS2_DFP@1.1.0\n",
        )
        .unwrap();

        let worker = manager.worker();
        assert_eq!(worker.list_project_devices(&project, "").unwrap(), vec!["ARM::ARMCM3"]);
        assert!(worker.list_project_components(&project, "").unwrap().is_empty());
    }

    #[test]
    fn test_project_without_packs_sees_everything() {
        let manager = manager();
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("app.cproject.yml");
        fs::write(&project, "project:\n  device: STM32F407VG\n").unwrap();

        let worker = manager.worker();
        assert_eq!(
            worker.list_project_components(&project, "").unwrap(),
            worker.list_components("")
        );
    }

    #[test]
    fn test_project_with_unresolved_references_is_an_error() {
        let manager = manager();
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("app.cproject.yml");
        fs::write(
            &project,
            "project:\n  device: STM32F407VG\n  packs:\n    - pack: ARM::CMSIS\n    - pack: Keil::Missing_DFP\n",
        )
        .unwrap();

        let err = manager.worker().list_project_devices(&project, "").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("required pack: Keil::Missing_DFP not found"));
        assert!(message.contains("specified device 'STM32F407VG' was not found"));

        let missing = dir.path().join("missing.cproject.yml");
        assert!(matches!(
            manager.worker().list_project_devices(&missing, ""),
            Err(ProjMgrError::NotFound(_))
        ));
    }

    #[test]
    fn test_unrecognised_token_matches_nothing() {
        let manager = manager();
        assert!(manager.worker().list_devices("xtensa").is_empty());
        assert!(manager.worker().list_components("xtensa").is_empty());
    }
}
