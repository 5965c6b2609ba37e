//! Solution, project and layer files
//!
//! Loading of the YAML files that describe a solution and the checks run on
//! them.

mod check;
mod loader;
mod types;

pub use check::{check_solution, select_project_packs, SOLUTION_SUFFIXES};
pub use loader::Source;
pub use types::{
    is_valid_type_name, BuildType, ComponentEntry, Define, FileEntry, Group, Interfaces, Layer,
    LayerEntry, LayerFile, Misc, OutputDirs, PackEntry, Processor, Project, ProjectEntry,
    ProjectFile, Setup, Solution, SolutionFile, TargetType, TypeFilter, TypePair,
};
