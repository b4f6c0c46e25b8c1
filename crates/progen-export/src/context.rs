//! Shared context preparation for the per-tool adapters.
//!
//! Every adapter turns the resolved project into a serializable template
//! context. The pieces common to all of them live here: relative-path
//! prefixing, per-role file lists, `misc` parsing and the small vendor
//! lookup tables.

use progen_core::{util, FileRole, Settings};
use progen_resolver::{ProjectDescription, ToolId};
use progen_targets::Target;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Everything an exporter or builder needs for one project and tool.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    /// The resolved project
    pub project: &'a ProjectDescription,
    /// The target record the project names
    pub target: &'a Target,
    /// Process settings (tool paths, template overrides)
    pub settings: &'a Settings,
}

impl ExportContext<'_> {
    /// Output directory of the generated project files.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        Path::new(&self.project.output_dir.path)
    }

    /// User template file override for `tool`, project-level first.
    #[must_use]
    pub fn template_override(&self, tool: ToolId) -> Option<PathBuf> {
        self.project
            .template
            .as_deref()
            .or_else(|| self.settings.tool_template(tool.as_str()))
            .map(PathBuf::from)
    }

    /// Prefix applied to project-root-relative paths so the generated
    /// files resolve them from inside the output directory. Staged
    /// copies live under `copy/` next to the generated files.
    #[must_use]
    pub fn rel_prefix(&self) -> &str {
        if self.project.copy_sources {
            "copy/"
        } else {
            &self.project.output_dir.rel_path
        }
    }

    /// Applies [`rel_prefix`](Self::rel_prefix) to one path.
    #[must_use]
    pub fn rel(&self, path: &str) -> String {
        util::normalize_path(&format!("{}{path}", self.rel_prefix()))
    }

    /// Include directories with the relative prefix applied.
    #[must_use]
    pub fn rel_includes(&self) -> Vec<String> {
        self.project
            .includes
            .iter()
            .map(|path| self.rel(path))
            .collect()
    }

    /// All files of one role across every group, prefix applied.
    #[must_use]
    pub fn rel_sources_of(&self, role: FileRole) -> Vec<String> {
        self.project
            .all_sources_of(role)
            .into_iter()
            .map(|path| self.rel(path))
            .collect()
    }

    /// Linker file with the prefix applied, empty when absent (library
    /// projects).
    #[must_use]
    pub fn rel_linker_file(&self) -> String {
        self.project
            .linker_file
            .as_deref()
            .map(|path| self.rel(path))
            .unwrap_or_default()
    }

    /// Per-group file lists for IDE-style exporters that preserve the
    /// user's grouping.
    #[must_use]
    pub fn file_groups(&self) -> Vec<FileGroup> {
        self.project
            .source_groups
            .iter()
            .map(|(name, group)| FileGroup {
                name: name.clone(),
                files: group
                    .iter()
                    .flat_map(|(role, files)| {
                        files.iter().map(move |path| GroupFile {
                            path: self.rel(path),
                            name: file_name(path),
                            type_code: uvision_type_code(role),
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Core identifier for the project, project-level override first.
    #[must_use]
    pub fn core(&self) -> &str {
        self.project.core.as_deref().unwrap_or_else(|| self.target.core())
    }
}

/// One named source group, flattened for templates.
#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    /// Group name as declared in YAML
    pub name: String,
    /// Files of the group, every role mixed, role order then file order
    pub files: Vec<GroupFile>,
}

/// One file inside a group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFile {
    /// Path with the relative prefix applied
    pub path: String,
    /// Bare file name
    pub name: String,
    /// uVision numeric file type
    pub type_code: u8,
}

/// Parsed view of the opaque `misc` mapping.
///
/// Values tolerate both the scalar and the one-element-list YAML shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MiscOptions {
    /// Library names passed to the linker (`-l` style)
    pub libraries: Vec<String>,
    /// Extra compiler flags
    pub compiler_options: Vec<String>,
    /// Extra linker flags
    pub linker_options: Vec<String>,
    /// Optimization level (`O0`..`Os`)
    pub optimization: Option<String>,
    /// C++ standard (`c++11`, ...)
    pub cc_standard: Option<String>,
    /// C standard (`gnu99`, ...)
    pub c_standard: Option<String>,
    /// `thumb` or `arm`
    pub instruction_mode: Option<String>,
}

impl MiscOptions {
    /// Extracts the recognized keys; everything else stays opaque and is
    /// passed through untouched by the adapters that want raw `misc`.
    #[must_use]
    pub fn from_mapping(misc: &Mapping) -> Self {
        Self {
            libraries: strings_of(misc.get(Value::from("libraries"))),
            compiler_options: strings_of(misc.get(Value::from("compiler_options"))),
            linker_options: strings_of(misc.get(Value::from("linker_options"))),
            optimization: scalar_of(misc.get(Value::from("optimization"))),
            cc_standard: scalar_of(misc.get(Value::from("cc_standard"))),
            c_standard: scalar_of(misc.get(Value::from("c_standard"))),
            instruction_mode: scalar_of(misc.get(Value::from("instruction_mode"))),
        }
    }
}

fn strings_of(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_of(value: Option<&Value>) -> Option<String> {
    strings_of(value).into_iter().next()
}

fn file_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Maps a core identifier to the GCC `-mcpu` spelling: the FPU suffix
/// is dropped and `+` becomes `plus`.
#[must_use]
pub fn normalize_core(core: &str) -> String {
    let mut core = core.to_lowercase();
    if core.ends_with('f') {
        core.pop();
    }
    core.replace('+', "plus")
}

/// uVision numeric file type for one role.
#[must_use]
pub const fn uvision_type_code(role: FileRole) -> u8 {
    match role {
        FileRole::C => 1,
        FileRole::Asm => 2,
        FileRole::Object => 3,
        FileRole::Archive => 4,
        FileRole::Cpp => 8,
    }
}

/// Debug driver DLL for a debugger identifier. Unknown debuggers fall
/// back to CMSIS-DAP with a warning.
#[must_use]
pub fn debugger_dll(debugger: &str) -> &'static str {
    match debugger {
        "cmsis-dap" => r"BIN\CMSIS_AGDI.dll",
        "j-link" => r"Segger\JL2CM3.dll",
        other => {
            tracing::warn!("unknown debugger \"{other}\", falling back to cmsis-dap");
            r"BIN\CMSIS_AGDI.dll"
        }
    }
}
