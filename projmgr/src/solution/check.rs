//! Solution checks
//!
//! Walks a solution and every project and layer it references, checking the
//! schema, the declared build and target types, and that every pack, device
//! and component reference resolves against the installed packs.

use std::collections::HashSet;
use std::path::Path;

use cmsis_packs::pdsc::read_pdsc;
use cmsis_packs::root::find_pdsc_in;
use cmsis_packs::{ComponentRef, DeviceRef, Pack, PackIndex, PackRef};
use tracing::debug;

use super::loader::Source;
use super::types::{
    is_valid_type_name, ComponentEntry, Group, LayerFile, PackEntry, Project, ProjectFile,
    SolutionFile, TypeFilter, TypePair,
};
use crate::config::ValidateConfig;
use crate::error::ProjMgrError;
use crate::validation::ValidationResult;

/// File name endings of solution files.
pub const SOLUTION_SUFFIXES: [&str; 2] = [".csolution.yml", ".csolution.yaml"];

const COMPILERS: [&str; 4] = ["AC6", "GCC", "IAR", "CLANG"];

/// Check a solution that has already been read from disk.
pub fn check_solution(
    index: &PackIndex,
    settings: ValidateConfig,
    source: &Source,
) -> ValidationResult {
    let mut checker = Checker::new(index, settings);
    checker.check(source);
    checker.finish()
}

/// Packs a project's `packs:` entries select, as listing scope.
///
/// A project without pack entries selects every installed pack. Entries
/// that do not resolve, and a project device missing from the selection,
/// are reported in the returned result.
pub fn select_project_packs(
    index: &PackIndex,
    source: &Source,
    project: &Project,
) -> (Vec<Pack>, ValidationResult) {
    let mut checker = Checker::new(index, ValidateConfig::default());
    checker.check_packs(source, &project.packs);
    if let Some(device) = &project.device {
        checker.check_device(source, device);
    }
    let packs = checker.selected_packs().into_iter().cloned().collect();
    (packs, checker.finish())
}

struct Checker<'a> {
    index: &'a PackIndex,
    settings: ValidateConfig,
    result: ValidationResult,
    build_types: Vec<String>,
    target_types: Vec<String>,
    /// Installed packs required by the solution and its projects
    pack_refs: Vec<PackRef>,
    /// Packs loaded from `path:` entries
    local_packs: Vec<Pack>,
}

impl<'a> Checker<'a> {
    fn new(index: &'a PackIndex, settings: ValidateConfig) -> Self {
        Self {
            index,
            settings,
            result: ValidationResult::new(),
            build_types: Vec::new(),
            target_types: Vec::new(),
            pack_refs: Vec::new(),
            local_packs: Vec::new(),
        }
    }

    fn finish(mut self) -> ValidationResult {
        if self.settings.warnings_as_errors {
            self.result.promote_warnings();
        }
        self.result
    }

    fn check(&mut self, source: &Source) {
        let file_name = source
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if !SOLUTION_SUFFIXES.iter().any(|s| file_name.ends_with(s)) {
            self.result.add_warning(
                &source.path,
                None,
                "file",
                "solution file name should end in '.csolution.yml'",
            );
        }

        let solution = match source.parse::<SolutionFile>() {
            Ok(file) => file.solution,
            Err(issue) => {
                self.result.errors.push(issue);
                return;
            }
        };

        if solution.target_types.is_empty() {
            self.error(source, "target-types", None, "at least one target-type is required");
        }
        if solution.projects.is_empty() {
            self.error(source, "projects", None, "at least one project is required");
        }

        let target_names: Vec<&str> = solution.target_types.iter().map(|t| t.name.as_str()).collect();
        let build_names: Vec<&str> = solution.build_types.iter().map(|t| t.name.as_str()).collect();
        self.target_types = self.check_type_names(source, &target_names);
        self.build_types = self.check_type_names(source, &build_names);

        self.check_compiler(source, "compiler", solution.compiler.as_deref());
        for target in &solution.target_types {
            self.check_compiler(source, "compiler", target.compiler.as_deref());
        }
        for build in &solution.build_types {
            self.check_compiler(source, "compiler", build.compiler.as_deref());
        }

        self.check_packs(source, &solution.packs);

        let mut projects = Vec::new();
        for entry in &solution.projects {
            self.check_type_filters(source, &entry.for_type, &entry.not_for_type);
            self.check_compiler_filter(source, &entry.for_compiler);
            if let Some(project) = self.load_project(source, &entry.project) {
                self.check_packs(&project.0, &project.1.packs);
                projects.push(project);
            }
        }

        for target in &solution.target_types {
            match &target.device {
                Some(device) => self.check_device(source, device),
                None if target.board.is_none() => self.warning(
                    source,
                    "type",
                    Some(target.name.as_str()),
                    &format!("target-type '{}' has neither a device nor a board", target.name),
                ),
                None => {}
            }
        }

        for (project_source, project) in &projects {
            self.check_project(project_source, project);
        }
    }

    /// Returns the valid, distinct names.
    fn check_type_names(&mut self, source: &Source, names: &[&str]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut valid = Vec::new();
        for &name in names {
            if !is_valid_type_name(name) {
                self.error(source, "type", Some(name), &format!("invalid type name '{}'", name));
            } else if !seen.insert(name) {
                self.error(
                    source,
                    "type",
                    Some(name),
                    &format!("type '{}' is declared more than once", name),
                );
            } else {
                valid.push(name.to_string());
            }
        }
        valid
    }

    fn check_type_filters(
        &mut self,
        source: &Source,
        for_type: &Option<TypeFilter>,
        not_for_type: &Option<TypeFilter>,
    ) {
        let filters = [("for-type", for_type), ("not-for-type", not_for_type)];
        for (key, filter) in filters {
            let Some(filter) = filter else { continue };
            for entry in filter.entries() {
                let message = match TypePair::parse(entry) {
                    None => Some(format!("invalid type filter '{}'", entry)),
                    Some(pair) => self.undeclared_type(&pair),
                };
                if let Some(message) = message {
                    self.error(source, key, Some(entry), &message);
                }
            }
        }
    }

    fn undeclared_type(&self, pair: &TypePair) -> Option<String> {
        if let Some(build) = &pair.build {
            if !self.build_types.contains(build) {
                return Some(format!("build-type '{}' is not declared in the solution", build));
            }
        }
        if let Some(target) = &pair.target {
            if !self.target_types.contains(target) {
                return Some(format!("target-type '{}' is not declared in the solution", target));
            }
        }
        None
    }

    fn check_compiler(&mut self, source: &Source, key: &str, compiler: Option<&str>) {
        let Some(compiler) = compiler else { return };
        let name = compiler.split('@').next().unwrap_or("").trim();
        if !COMPILERS.contains(&name) {
            self.error(
                source,
                key,
                Some(compiler),
                &format!(
                    "compiler '{}' is not supported, expected one of {}",
                    compiler,
                    COMPILERS.join(", ")
                ),
            );
        }
    }

    fn check_compiler_filter(&mut self, source: &Source, for_compiler: &Option<TypeFilter>) {
        let Some(filter) = for_compiler else { return };
        for entry in filter.entries() {
            self.check_compiler(source, "for-compiler", Some(entry));
        }
    }

    fn check_packs(&mut self, source: &Source, packs: &[PackEntry]) {
        for entry in packs {
            self.check_type_filters(source, &entry.for_type, &entry.not_for_type);
            self.check_compiler_filter(source, &entry.for_compiler);
            let reference = match PackRef::parse(&entry.pack) {
                Ok(reference) => reference,
                Err(e) => {
                    self.error(source, "pack", Some(entry.pack.as_str()), &e.to_string());
                    continue;
                }
            };

            if let Some(path) = &entry.path {
                self.load_local_pack(source, &entry.pack, path);
                continue;
            }

            if self.index.find_packs(&reference).next().is_none() {
                self.error(
                    source,
                    "pack",
                    Some(entry.pack.as_str()),
                    &format!("required pack: {} not found", reference),
                );
            } else {
                debug!(pack = %reference, "pack requirement satisfied");
                self.pack_refs.push(reference);
            }
        }
    }

    fn load_local_pack(&mut self, source: &Source, pack: &str, path: &str) {
        let dir = source.dir().join(path);
        if !dir.is_dir() {
            self.error(
                source,
                "path",
                Some(path),
                &format!("pack path: {} does not exist", path),
            );
            return;
        }
        let loaded = find_pdsc_in(&dir)
            .and_then(|pdsc| pdsc.map(|pdsc| read_pdsc(&pdsc, None)).transpose());
        match loaded {
            Ok(Some(local)) => {
                debug!(pack = %local.id, dir = %dir.display(), "loaded local pack");
                self.local_packs.push(local);
            }
            Ok(None) => self.error(
                source,
                "pack",
                Some(pack),
                &format!("no pdsc file found under: {}", path),
            ),
            Err(e) => self.error(source, "pack", Some(pack), &e.to_string()),
        }
    }

    /// Packs that device and component references resolve against.
    fn selected_packs(&self) -> Vec<&Pack> {
        if self.pack_refs.is_empty() && self.local_packs.is_empty() {
            return self.index.packs().iter().collect();
        }
        let mut selected = if self.pack_refs.is_empty() {
            Vec::new()
        } else {
            self.index.select(&self.pack_refs)
        };
        selected.extend(self.local_packs.iter());
        selected
    }

    fn check_device(&mut self, source: &Source, device: &str) {
        let reference = DeviceRef::parse(device);
        let found = self
            .selected_packs()
            .iter()
            .any(|p| p.devices.iter().any(|d| reference.matches(d)));
        if !found {
            self.error(
                source,
                "device",
                Some(device),
                &format!(
                    "specified device '{}' was not found among the installed packs",
                    device
                ),
            );
        }
    }

    fn check_components(&mut self, source: &Source, components: &[ComponentEntry]) {
        for entry in components {
            self.check_type_filters(source, &entry.for_type, &entry.not_for_type);
            self.check_compiler_filter(source, &entry.for_compiler);
            self.check_compiler(source, "compiler", entry.compiler.as_deref());
            let message = match ComponentRef::parse(&entry.component) {
                None => Some(format!("invalid component identifier '{}'", entry.component)),
                Some(reference) => {
                    let found = self
                        .selected_packs()
                        .iter()
                        .any(|p| p.components.iter().any(|c| reference.matches(c)));
                    (!found).then(|| {
                        format!("no component was found with identifier '{}'", entry.component)
                    })
                }
            };
            if let Some(message) = message {
                self.error(source, "component", Some(entry.component.as_str()), &message);
            }
        }
    }

    fn check_groups(&mut self, source: &Source, groups: &[Group]) {
        for group in groups {
            self.check_type_filters(source, &group.for_type, &group.not_for_type);
            self.check_compiler_filter(source, &group.for_compiler);
            for file in &group.files {
                self.check_type_filters(source, &file.for_type, &file.not_for_type);
                self.check_compiler_filter(source, &file.for_compiler);
                if self.settings.check_files
                    && !has_variables(&file.file)
                    && !source.dir().join(&file.file).exists()
                {
                    self.warning(
                        source,
                        "file",
                        Some(file.file.as_str()),
                        &format!("file '{}' was not found", file.file),
                    );
                }
            }
            self.check_groups(source, &group.groups);
        }
    }

    fn load_project(&mut self, solution: &Source, path: &str) -> Option<(Source, Project)> {
        if has_variables(path) {
            debug!(project = %path, "skipping project path with variables");
            return None;
        }
        let full = solution.dir().join(path);
        let source = self.read_referenced(solution, "project", path, &full)?;
        match source.parse::<ProjectFile>() {
            Ok(file) => Some((source, file.project)),
            Err(issue) => {
                self.result.errors.push(issue);
                None
            }
        }
    }

    fn check_project(&mut self, source: &Source, project: &Project) {
        debug!(project = %source.path.display(), "checking project");
        self.check_compiler(source, "compiler", project.compiler.as_deref());
        if let Some(device) = &project.device {
            self.check_device(source, device);
        }
        self.check_components(source, &project.components);
        self.check_groups(source, &project.groups);

        for setup in &project.setups {
            self.check_type_filters(source, &setup.for_type, &setup.not_for_type);
            self.check_compiler_filter(source, &setup.for_compiler);
            self.check_compiler(source, "compiler", setup.compiler.as_deref());
        }

        for entry in &project.layers {
            self.check_type_filters(source, &entry.for_type, &entry.not_for_type);
            self.check_compiler_filter(source, &entry.for_compiler);
            if has_variables(&entry.layer) {
                debug!(layer = %entry.layer, "skipping layer path with variables");
                continue;
            }
            let full = source.dir().join(&entry.layer);
            let Some(layer_source) = self.read_referenced(source, "layer", &entry.layer, &full)
            else {
                continue;
            };
            match layer_source.parse::<LayerFile>() {
                Ok(file) => {
                    self.check_components(&layer_source, &file.layer.components);
                    self.check_groups(&layer_source, &file.layer.groups);
                }
                Err(issue) => self.result.errors.push(issue),
            }
        }
    }

    /// Read a project or layer file, reporting a missing file on the referencing entry.
    fn read_referenced(
        &mut self,
        parent: &Source,
        key: &str,
        value: &str,
        path: &Path,
    ) -> Option<Source> {
        match Source::read(path) {
            Ok(source) => Some(source),
            Err(ProjMgrError::NotFound(_)) => {
                self.error(
                    parent,
                    key,
                    Some(value),
                    &format!("{} file '{}' was not found", key, value),
                );
                None
            }
            Err(e) => {
                self.error(parent, key, Some(value), &e.to_string());
                None
            }
        }
    }

    fn error(&mut self, source: &Source, key: &str, value: Option<&str>, message: &str) {
        let location = match value {
            Some(value) => source.locate(key, value),
            None => source.locate_key(key),
        };
        self.result.add_error(&source.path, location, key, message);
    }

    fn warning(&mut self, source: &Source, key: &str, value: Option<&str>, message: &str) {
        let location = match value {
            Some(value) => source.locate(key, value),
            None => source.locate_key(key),
        };
        self.result.add_warning(&source.path, location, key, message);
    }
}

/// Paths using `$Variable$` placeholders cannot be resolved here.
fn has_variables(path: &str) -> bool {
    path.contains('$')
}
