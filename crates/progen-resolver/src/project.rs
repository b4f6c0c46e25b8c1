//! The canonical resolved project description.

use progen_core::{util, Error, FileRole, Result};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::fragment::{SourceEntry, ToolSection};
use crate::ToolId;

/// What the project links into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// Executable image; requires a linker file
    #[default]
    Exe,
    /// Static library; no linker file needed
    Lib,
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exe" => Ok(Self::Exe),
            "lib" => Ok(Self::Lib),
            other => Err(Error::Config {
                message: format!("invalid output_type \"{other}\" (expected: exe or lib)"),
            }),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exe => "exe",
            Self::Lib => "lib",
        })
    }
}

/// Computed export location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDir {
    /// Templated export location, normalized, relative to project root
    pub path: String,
    /// Way back from `path` to the project root, with trailing separator
    pub rel_path: String,
    /// Directory-separator hops in `path`, for tools that count them
    pub hops: usize,
}

/// Source files of one user-defined group, bucketed by role.
///
/// Invariant: every path appears under exactly one role; the role is
/// derived solely from the extension via the classification table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceGroup {
    files: BTreeMap<FileRole, Vec<String>>,
}

impl SourceGroup {
    /// Appends a path under its role.
    pub fn add(&mut self, role: FileRole, path: String) {
        self.files.entry(role).or_default().push(path);
    }

    /// Files of one role, in insertion order.
    #[must_use]
    pub fn files_of(&self, role: FileRole) -> &[String] {
        self.files.get(&role).map_or(&[], Vec::as_slice)
    }

    /// Whether the group holds no files at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.values().all(Vec::is_empty)
    }

    /// Iterates over `(role, files)` pairs in role order.
    pub fn iter(&self) -> impl Iterator<Item = (FileRole, &[String])> {
        self.files.iter().map(|(role, files)| (*role, files.as_slice()))
    }
}

/// The canonical resolved project, handed to exporters and builders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDescription {
    /// Project name
    pub name: String,
    /// Executable or library
    pub output_type: OutputType,
    /// Include directories, deduplicated, first-seen order
    pub includes: Vec<String>,
    /// Individual header files explicitly named in `includes:`
    pub include_files: Vec<String>,
    /// Group name → role-bucketed source files
    pub source_groups: BTreeMap<String, SourceGroup>,
    /// Linker command file; required for executables
    pub linker_file: Option<String>,
    /// Preprocessor symbols, duplicates allowed, insertion order
    pub macros: Vec<String>,
    /// Tool-specific miscellaneous settings, opaque to the resolver
    pub misc: Mapping,
    /// Name of the MCU/board target, resolved later via the registry
    pub target_name: String,
    /// Processor core declared in the fragments, overriding the target
    /// definition's core when present
    pub core: Option<String>,
    /// Debugger identifier
    pub debugger: String,
    /// Build output directory inside the generated project
    pub build_dir: String,
    /// Computed export location
    pub output_dir: OutputDir,
    /// Tools this project can be generated for
    pub tools_supported: Vec<ToolId>,
    /// User template file override, if any
    pub template: Option<String>,
    /// Whether export should stage sources into the output directory
    pub copy_sources: bool,
}

/// The default source group name for ungrouped files.
pub const DEFAULT_GROUP: &str = "default";

impl ProjectDescription {
    /// All files of one role across every group, in group order.
    #[must_use]
    pub fn all_sources_of(&self, role: FileRole) -> Vec<&str> {
        self.source_groups
            .values()
            .flat_map(|group| group.files_of(role).iter().map(String::as_str))
            .collect()
    }

    /// Every source path of every role and group.
    #[must_use]
    pub fn all_sources(&self) -> Vec<&str> {
        FileRole::ALL
            .iter()
            .flat_map(|role| self.all_sources_of(*role))
            .collect()
    }
}

/// Accumulated `tool_specific` settings for one declared tool or
/// toolchain name.
///
/// Created lazily the first time a fragment references the name; owned
/// by the resolver for the duration of one resolution.
#[derive(Debug, Clone, Default)]
pub struct ToolSpecBundle {
    /// Raw source entries, classified during path fixing
    pub sources: Vec<SourceEntry>,
    /// Raw include entries, split into dir/file buckets later
    pub includes: Vec<String>,
    /// Additional macros
    pub macros: Vec<String>,
    /// Misc settings; later blocks overwrite keys of earlier ones
    pub misc: Mapping,
    /// Linker file override
    pub linker_file: Option<String>,
    /// Template override
    pub template: Option<String>,
}

impl ToolSpecBundle {
    /// Merges one fragment's block into the bundle: lists extend,
    /// scalars last-wins, misc keys overwrite.
    pub fn merge_section(&mut self, section: &ToolSection) {
        self.sources.extend(section.sources.iter().cloned());
        self.includes
            .extend(section.includes.iter().flatten().cloned());
        self.macros.extend(section.macros.iter().flatten().cloned());
        for (key, value) in &section.misc {
            self.misc.insert(key.clone(), value.clone());
        }
        if let Some(linker) = section.linker_file.first() {
            self.linker_file = Some(util::normalize_path(linker));
        }
        if let Some(template) = section.template.first() {
            self.template = Some(template.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_type_parsing() {
        assert_eq!("exe".parse::<OutputType>().unwrap(), OutputType::Exe);
        assert_eq!("lib".parse::<OutputType>().unwrap(), OutputType::Lib);
        assert!("dll".parse::<OutputType>().is_err());
        assert_eq!(OutputType::default(), OutputType::Exe);
    }

    #[test]
    fn test_source_group_buckets() {
        let mut group = SourceGroup::default();
        group.add(FileRole::C, "a.c".to_string());
        group.add(FileRole::C, "b.c".to_string());
        group.add(FileRole::Cpp, "c.cpp".to_string());

        assert_eq!(group.files_of(FileRole::C), ["a.c", "b.c"]);
        assert_eq!(group.files_of(FileRole::Cpp), ["c.cpp"]);
        assert!(group.files_of(FileRole::Asm).is_empty());
        assert!(!group.is_empty());
    }

    #[test]
    fn test_all_sources_spans_groups() {
        let mut project = ProjectDescription::default();
        let mut default_group = SourceGroup::default();
        default_group.add(FileRole::C, "main.c".to_string());
        let mut drivers = SourceGroup::default();
        drivers.add(FileRole::C, "uart.c".to_string());
        project.source_groups.insert(DEFAULT_GROUP.to_string(), default_group);
        project.source_groups.insert("drivers".to_string(), drivers);

        assert_eq!(project.all_sources_of(FileRole::C), vec!["main.c", "uart.c"]);
        assert_eq!(project.all_sources().len(), 2);
    }

    #[test]
    fn test_bundle_merge_scalar_last_wins() {
        let mut bundle = ToolSpecBundle::default();
        let first: ToolSection =
            serde_yaml::from_str("linker_file: [first.ld]\nmacros: [A]").unwrap();
        let second: ToolSection =
            serde_yaml::from_str("linker_file: [second.ld]\nmacros: [B]").unwrap();
        bundle.merge_section(&first);
        bundle.merge_section(&second);

        assert_eq!(bundle.linker_file.as_deref(), Some("second.ld"));
        assert_eq!(bundle.macros, vec!["A", "B"]);
    }
}
