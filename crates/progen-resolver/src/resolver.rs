//! The project model resolver.
//!
//! Resolution runs in four stages over the loaded fragments:
//!
//! 1. merge every `common` section into an internal draft and collect
//!    `tool_specific` blocks into per-name bundles,
//! 2. compute the supported-tool set and check the requested tool,
//! 3. classify sources, split includes, compute the output directory,
//! 4. overlay the bundles the requested tool consumes and enforce the
//!    linker-file invariant.
//!
//! The draft never escapes: on any error the caller gets an `Err` and no
//! partially resolved [`ProjectDescription`].

use progen_core::{classify_path, util, Error, FileKind, Result, Settings};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::fragment::{Fragment, SourceEntry};
use crate::project::{OutputDir, OutputType, ProjectDescription, ToolSpecBundle, DEFAULT_GROUP};
use crate::tools::ToolId;

/// Resolves one named project from its fragments.
///
/// One instance per project per run; holds no state between calls
/// besides the project name and a settings reference.
#[derive(Debug)]
pub struct Resolver<'a> {
    name: String,
    settings: &'a Settings,
}

/// Stage-1 accumulation of the merged `common` sections.
#[derive(Debug, Default)]
struct Draft {
    sources: Vec<SourceEntry>,
    includes: Vec<String>,
    macros: Vec<String>,
    target: Option<String>,
    core: Option<String>,
    linker_file: Option<String>,
    output_type: OutputType,
    declared_tools: Vec<String>,
    debugger: Option<String>,
    build_dir: Option<String>,
    export_dir: Option<String>,
    bundles: BTreeMap<String, ToolSpecBundle>,
}

impl Draft {
    /// Merges fragments in file order: lists extend, scalars last-wins.
    fn merge(fragments: &[Fragment]) -> Result<Self> {
        let mut draft = Self::default();
        for fragment in fragments {
            let common = &fragment.common;
            draft.sources.extend(common.sources.iter().cloned());
            draft
                .includes
                .extend(common.includes.iter().flatten().cloned());
            draft.macros.extend(common.macros.iter().flatten().cloned());
            for tool in &common.tools_supported {
                util::push_unique(&mut draft.declared_tools, tool.clone());
            }
            if let Some(target) = common.target.first() {
                draft.target = Some(target.clone());
            }
            if let Some(core) = common.core.first() {
                draft.core = Some(core.clone());
            }
            if let Some(linker) = common.linker_file.first() {
                draft.linker_file = Some(util::normalize_path(linker));
            }
            if let Some(output_type) = common.output_type.first() {
                draft.output_type = output_type.parse()?;
            }
            if let Some(debugger) = common.debugger.first() {
                draft.debugger = Some(debugger.clone());
            }
            if let Some(build_dir) = common.build_dir.first() {
                draft.build_dir = Some(util::normalize_path(build_dir));
            }
            if let Some(export_dir) = common.export_dir.first() {
                draft.export_dir = Some(util::normalize_path(export_dir));
            }
            for (name, section) in &fragment.tool_specific {
                draft
                    .bundles
                    .entry(name.clone())
                    .or_default()
                    .merge_section(section);
            }
        }
        Ok(draft)
    }

    /// Every tool or toolchain name the fragments reference.
    fn declared_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        for tool in &self.declared_tools {
            if !names.contains(&tool.as_str()) {
                names.push(tool);
            }
        }
        names
    }

    /// Concrete tools whose accepted-name list intersects the declared
    /// set. A project declaring nothing constrains nothing.
    fn supported_tools(&self) -> Vec<ToolId> {
        let declared = self.declared_names();
        if declared.is_empty() {
            return ToolId::ALL.to_vec();
        }
        ToolId::ALL
            .into_iter()
            .filter(|tool| {
                tool.accepted_names()
                    .iter()
                    .any(|name| declared.contains(name))
            })
            .collect()
    }
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for one named project.
    pub fn new(name: impl Into<String>, settings: &'a Settings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    /// Tools the project's fragments declare support for.
    ///
    /// Runs the merge and tool-resolution stages only; no path fixing,
    /// no filesystem access.
    pub fn enumerate_supported(&self, fragments: &[Fragment]) -> Result<Vec<ToolId>> {
        Ok(Draft::merge(fragments)?.supported_tools())
    }

    /// Resolves the project for one concrete tool.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedTool`] when the fragments do not declare the
    /// requested tool, [`Error::Config`] for an invalid ignore pattern
    /// or output type, [`Error::MissingLinkerFile`] when an executable
    /// project resolves without a linker file.
    pub fn resolve(
        &self,
        fragments: &[Fragment],
        tool: ToolId,
        ignore_patterns: &[String],
    ) -> Result<ProjectDescription> {
        let draft = Draft::merge(fragments)?;

        let supported = draft.supported_tools();
        if !supported.contains(&tool) {
            return Err(Error::UnsupportedTool {
                tool: tool.to_string(),
                supported: supported.iter().map(ToString::to_string).collect(),
            });
        }

        let mut ignores = compile_ignores(ignore_patterns)?;
        let output_dir = self.output_dir(&draft, tool);
        // re-runs must not ingest previously generated files
        ignores.push(compile_ignore(&regex::escape(&output_dir.path))?);

        let mut project = ProjectDescription {
            name: self.name.clone(),
            output_type: draft.output_type,
            linker_file: draft.linker_file.clone(),
            macros: draft.macros.clone(),
            target_name: draft.target.clone().unwrap_or_default(),
            core: draft.core.clone(),
            debugger: draft
                .debugger
                .clone()
                .unwrap_or_else(|| "cmsis-dap".to_string()),
            build_dir: draft.build_dir.clone().unwrap_or_else(|| "build".to_string()),
            output_dir,
            tools_supported: supported,
            ..ProjectDescription::default()
        };

        for entry in &draft.sources {
            add_source_entry(&mut project, entry, &ignores)?;
        }
        for include in &draft.includes {
            add_include(&mut project, include);
        }

        for name in overlay_order(tool) {
            let Some(bundle) = draft.bundles.get(name) else {
                continue;
            };
            apply_bundle(&mut project, bundle, &ignores)?;
        }

        if project.output_type == OutputType::Exe && project.linker_file.is_none() {
            return Err(Error::MissingLinkerFile {
                project: project.name,
            });
        }
        Ok(project)
    }

    /// Computes the export location for one tool.
    ///
    /// Project-level `export_dir` wins over the settings template. The
    /// `{target}` placeholder stays literal when no target is set.
    fn output_dir(&self, draft: &Draft, tool: ToolId) -> OutputDir {
        let template = draft
            .export_dir
            .as_deref()
            .unwrap_or_else(|| self.settings.export_location_format());
        let mut vars = vec![("project_name", self.name.as_str()), ("tool", tool.as_str())];
        if let Some(target) = &draft.target {
            vars.push(("target", target));
        }
        let path = util::normalize_path(&util::partial_format(template, &vars));
        let (rel_path, hops) = util::relative_up(&path);
        OutputDir { path, rel_path, hops }
    }
}

/// Bundle names the tool consumes, least specific first so the
/// canonical-id bundle wins conflicting scalars.
fn overlay_order(tool: ToolId) -> impl Iterator<Item = &'static str> {
    tool.accepted_names().iter().rev().copied()
}

fn compile_ignore(pattern: &str) -> Result<Regex> {
    let anchored = if pattern.starts_with('^') {
        pattern.to_string()
    } else {
        format!("^{pattern}")
    };
    Regex::new(&anchored).map_err(|err| Error::Config {
        message: format!("invalid ignore pattern \"{pattern}\": {err}"),
    })
}

fn compile_ignores(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_ignore(p)).collect()
}

fn is_ignored(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|pattern| pattern.is_match(path))
}

/// Classifies one `sources:` entry into the project's groups.
fn add_source_entry(
    project: &mut ProjectDescription,
    entry: &SourceEntry,
    ignores: &[Regex],
) -> Result<()> {
    match entry {
        SourceEntry::Path(path) => add_source_path(project, DEFAULT_GROUP, path, ignores),
        SourceEntry::Group(groups) => {
            for (group, paths) in groups {
                for path in paths {
                    add_source_path(project, group, path, ignores)?;
                }
            }
            Ok(())
        }
    }
}

fn add_source_path(
    project: &mut ProjectDescription,
    group: &str,
    path: &str,
    ignores: &[Regex],
) -> Result<()> {
    let path = util::normalize_path(path);
    if is_ignored(&path, ignores) {
        tracing::debug!("ignoring source path {path}");
        return Ok(());
    }
    if Path::new(&path).is_dir() {
        return add_source_dir(project, group, &path, ignores);
    }
    add_source_file(project, group, path);
    Ok(())
}

/// Expands a directory entry to the files directly inside it, in name
/// order so resolution stays deterministic across platforms.
fn add_source_dir(
    project: &mut ProjectDescription,
    group: &str,
    dir: &str,
    ignores: &[Regex],
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.into(),
        source,
    })?;
    let mut names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for name in names {
        let path = format!("{dir}/{name}");
        if is_ignored(&path, ignores) {
            tracing::debug!("ignoring source path {path}");
            continue;
        }
        add_source_file(project, group, path);
    }
    Ok(())
}

fn add_source_file(project: &mut ProjectDescription, group: &str, path: String) {
    match classify_path(&path) {
        Some(FileKind::Source(role)) => {
            project
                .source_groups
                .entry(group.to_string())
                .or_default()
                .add(role, path);
        }
        Some(FileKind::Linker) => {
            project.linker_file = Some(path);
        }
        Some(FileKind::Include) => {
            add_include(project, &path);
        }
        None => {
            tracing::debug!("dropping {path}: unrecognized extension");
        }
    }
}

/// Sorts one `includes:` entry into the directory and file buckets.
///
/// An entry counts as a file when its extension classifies as a header
/// or when it exists as a regular file; its parent directory joins
/// `includes` and the path itself is recorded in `include_files`.
fn add_include(project: &mut ProjectDescription, entry: &str) {
    let entry = util::normalize_path(entry);
    let is_file = matches!(classify_path(&entry), Some(FileKind::Include))
        || Path::new(&entry).is_file();
    if is_file {
        let parent = entry
            .rsplit_once('/')
            .map_or(".", |(parent, _)| parent)
            .to_string();
        util::push_unique(&mut project.includes, parent);
        util::push_unique(&mut project.include_files, entry);
    } else {
        util::push_unique(&mut project.includes, entry);
    }
}

/// Overlays one tool-specific bundle: lists extend, scalars win.
fn apply_bundle(
    project: &mut ProjectDescription,
    bundle: &ToolSpecBundle,
    ignores: &[Regex],
) -> Result<()> {
    for entry in &bundle.sources {
        add_source_entry(project, entry, ignores)?;
    }
    for include in &bundle.includes {
        add_include(project, include);
    }
    project.macros.extend(bundle.macros.iter().cloned());
    for (key, value) in &bundle.misc {
        project.misc.insert(key.clone(), value.clone());
    }
    if let Some(linker) = &bundle.linker_file {
        project.linker_file = Some(linker.clone());
    }
    if let Some(template) = &bundle.template {
        project.template = Some(template.clone());
    }
    Ok(())
}
