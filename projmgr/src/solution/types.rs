//! Solution, project and layer file types
//!
//! Every struct rejects unknown keys so misspelled settings surface as
//! validation errors instead of being silently ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declares a struct that also carries the build settings shared by
/// solutions, types, projects and components.
macro_rules! with_build_settings {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$field_meta:meta])* pub $field:ident: $ty:ty,)*
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $($(#[$field_meta])* pub $field: $ty,)*
            /// `AC6`, `GCC`, `IAR` or `CLANG`, optionally with `@[>=]version`
            #[serde(default)]
            pub compiler: Option<String>,
            #[serde(default)]
            pub optimize: Option<Optimize>,
            #[serde(default)]
            pub debug: Option<Switch>,
            #[serde(default)]
            pub warnings: Option<Warnings>,
            #[serde(default)]
            pub define: Vec<Define>,
            #[serde(default)]
            pub undefine: Vec<String>,
            #[serde(default)]
            pub add_path: Vec<String>,
            #[serde(default)]
            pub del_path: Vec<String>,
            #[serde(default)]
            pub misc: Vec<Misc>,
        }
    };
}

/// Root of a `*.csolution.yml` file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolutionFile {
    pub solution: Solution,
}

with_build_settings! {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct Solution {
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub created_by: Option<String>,
        #[serde(default)]
        pub created_for: Option<String>,
        #[serde(default)]
        pub packs: Vec<PackEntry>,
        #[serde(default)]
        pub target_types: Vec<TargetType>,
        #[serde(default)]
        pub build_types: Vec<BuildType>,
        #[serde(default)]
        pub projects: Vec<ProjectEntry>,
        #[serde(default)]
        pub output_dirs: Option<OutputDirs>,
    }
}

/// A pack required by a solution or project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackEntry {
    pub pack: String,
    /// Local directory holding the pack description
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub for_type: Option<TypeFilter>,
    #[serde(default)]
    pub not_for_type: Option<TypeFilter>,
    /// Compilers the entry applies to
    #[serde(default)]
    pub for_compiler: Option<TypeFilter>,
}

with_build_settings! {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct TargetType {
        #[serde(rename = "type")]
        pub name: String,
        #[serde(default)]
        pub device: Option<String>,
        #[serde(default)]
        pub board: Option<String>,
        #[serde(default)]
        pub processor: Option<Processor>,
    }
}

with_build_settings! {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct BuildType {
        #[serde(rename = "type")]
        pub name: String,
    }
}

/// A project listed in a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectEntry {
    /// Path to the `*.cproject.yml`, relative to the solution
    pub project: String,
    #[serde(default)]
    pub for_type: Option<TypeFilter>,
    #[serde(default)]
    pub not_for_type: Option<TypeFilter>,
    #[serde(default)]
    pub for_compiler: Option<TypeFilter>,
}

/// Root of a `*.cproject.yml` file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub project: Project,
}

with_build_settings! {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct Project {
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub output_type: Option<OutputType>,
        #[serde(default)]
        pub device: Option<String>,
        #[serde(default)]
        pub board: Option<String>,
        #[serde(default)]
        pub processor: Option<Processor>,
        #[serde(default)]
        pub packs: Vec<PackEntry>,
        #[serde(default)]
        pub components: Vec<ComponentEntry>,
        #[serde(default)]
        pub groups: Vec<Group>,
        #[serde(default)]
        pub layers: Vec<LayerEntry>,
        #[serde(default)]
        pub setups: Vec<Setup>,
        #[serde(default)]
        pub output_dirs: Option<OutputDirs>,
    }
}

with_build_settings! {
    /// Build settings applied to the contexts a setup's filters select
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct Setup {
        pub setup: String,
        #[serde(default)]
        pub for_type: Option<TypeFilter>,
        #[serde(default)]
        pub not_for_type: Option<TypeFilter>,
        #[serde(default)]
        pub for_compiler: Option<TypeFilter>,
    }
}

/// Output directories, relative to the file that declares them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputDirs {
    #[serde(default)]
    pub cprjdir: Option<String>,
    #[serde(default)]
    pub intdir: Option<String>,
    #[serde(default)]
    pub outdir: Option<String>,
    #[serde(default)]
    pub rtedir: Option<String>,
}

/// Root of a `*.clayer.yml` file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerFile {
    pub layer: Layer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Layer {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub interfaces: Option<Interfaces>,
}

/// Interfaces a layer provides to and consumes from other layers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Interfaces {
    #[serde(default)]
    pub provides: Vec<BTreeMap<String, serde_yaml::Value>>,
    #[serde(default)]
    pub consumes: Vec<BTreeMap<String, serde_yaml::Value>>,
}

with_build_settings! {
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct ComponentEntry {
        pub component: String,
        #[serde(default)]
        pub for_type: Option<TypeFilter>,
        #[serde(default)]
        pub not_for_type: Option<TypeFilter>,
        #[serde(default)]
        pub for_compiler: Option<TypeFilter>,
    }
}

/// A source group; groups nest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Group {
    pub group: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub for_type: Option<TypeFilter>,
    #[serde(default)]
    pub not_for_type: Option<TypeFilter>,
    #[serde(default)]
    pub for_compiler: Option<TypeFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEntry {
    pub file: String,
    /// Overrides the category derived from the file extension
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub for_type: Option<TypeFilter>,
    #[serde(default)]
    pub not_for_type: Option<TypeFilter>,
    #[serde(default)]
    pub for_compiler: Option<TypeFilter>,
}

/// A layer included by a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayerEntry {
    /// Path to the `*.clayer.yml`, relative to the project
    pub layer: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub for_type: Option<TypeFilter>,
    #[serde(default)]
    pub not_for_type: Option<TypeFilter>,
    #[serde(default)]
    pub for_compiler: Option<TypeFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Processor {
    #[serde(default)]
    pub fpu: Option<Fpu>,
    #[serde(default)]
    pub trustzone: Option<TrustZone>,
    #[serde(default)]
    pub endian: Option<Endian>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fpu {
    On,
    Off,
    Sp,
    Dp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustZone {
    Secure,
    NonSecure,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimize {
    None,
    Balanced,
    Size,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warnings {
    On,
    Off,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Exe,
    Lib,
}

/// `NAME` or `NAME: value`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Define {
    Name(String),
    Value(BTreeMap<String, serde_yaml::Value>),
}

/// Toolchain-specific flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Misc {
    #[serde(default)]
    pub compiler: Option<String>,
    #[serde(default, rename = "ASM")]
    pub asm: Vec<String>,
    #[serde(default, rename = "C")]
    pub c: Vec<String>,
    #[serde(default, rename = "CPP")]
    pub cpp: Vec<String>,
    #[serde(default, rename = "C-CPP")]
    pub c_cpp: Vec<String>,
    #[serde(default, rename = "Link")]
    pub link: Vec<String>,
    #[serde(default, rename = "Lib")]
    pub lib: Vec<String>,
}

/// `for-type`, `not-for-type` or `for-compiler` value: one entry or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeFilter {
    One(String),
    Many(Vec<String>),
}

impl TypeFilter {
    pub fn entries(&self) -> Vec<&str> {
        match self {
            TypeFilter::One(entry) => vec![entry.as_str()],
            TypeFilter::Many(entries) => entries.iter().map(String::as_str).collect(),
        }
    }
}

/// A parsed type filter entry: `[.build][+target]` in either order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePair {
    pub build: Option<String>,
    pub target: Option<String>,
}

impl TypePair {
    /// Returns `None` when the entry is not of the form `[.build][+target]`.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let mut pair = TypePair::default();
        let mut rest = entry;
        while !rest.is_empty() {
            let slot = match rest.chars().next()? {
                '.' => &mut pair.build,
                '+' => &mut pair.target,
                _ => return None,
            };
            let body = &rest[1..];
            let end = body.find(['.', '+']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            if slot.is_some() {
                return None;
            }
            *slot = Some(name.to_string());
            rest = &body[end..];
        }
        if pair.build.is_none() && pair.target.is_none() {
            return None;
        }
        Some(pair)
    }
}

/// Type names may use ASCII letters, digits, `_` and `-`.
pub fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
