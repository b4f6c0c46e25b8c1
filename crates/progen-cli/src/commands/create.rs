//! `create` — scaffold project YAML from an existing source tree.
//!
//! Scans a directory, buckets what it finds by file kind and writes a
//! starter fragment plus a `projects.yaml` referencing it. The output
//! is meant to be edited, not shipped as-is.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use progen_core::util::push_unique;
use progen_core::{classify_path, FileKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Serialize)]
struct ScaffoldFragment {
    common: ScaffoldCommon,
}

#[derive(Debug, Serialize)]
struct ScaffoldCommon {
    sources: Vec<String>,
    includes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linker_file: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools_supported: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    target: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScaffoldProjects {
    projects: BTreeMap<String, Vec<String>>,
}

pub fn run(directory: &Path, name: Option<&str>, target: Option<&str>) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => directory
            .canonicalize()
            .ok()
            .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string()),
    };

    let common = scan(directory)?;
    if common.sources.is_empty() {
        bail!(
            "no recognized source files under {}; nothing to scaffold",
            directory.display()
        );
    }
    let fragment = ScaffoldFragment {
        common: ScaffoldCommon {
            target: target.map(|t| vec![t.to_string()]).unwrap_or_default(),
            ..common
        },
    };

    let fragment_file = format!("{name}.yaml");
    write_yaml(&directory.join(&fragment_file), &fragment)?;

    let mut projects = BTreeMap::new();
    projects.insert(name.clone(), vec![fragment_file.clone()]);
    write_yaml(&directory.join("projects.yaml"), &ScaffoldProjects { projects })?;

    println!(
        "{} {fragment_file} and projects.yaml in {}",
        "created".green().bold(),
        directory.display()
    );
    if target.is_none() {
        eprintln!("note: no target given, add one to {fragment_file} before generating");
    }
    Ok(())
}

/// Walks the tree and buckets every recognized file.
///
/// Hidden entries and generated output directories are skipped so a
/// rescan after generating does not pick up its own output.
fn scan(directory: &Path) -> Result<ScaffoldCommon> {
    let mut sources = Vec::new();
    let mut includes = Vec::new();
    let mut linker_files = Vec::new();

    for entry in WalkDir::new(directory)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !skip_entry(entry))
    {
        let entry = entry.with_context(|| format!("scanning {}", directory.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = slash_path(entry.path().strip_prefix(directory).unwrap_or(entry.path()));
        match classify_path(&rel) {
            Some(FileKind::Source(_)) => sources.push(rel),
            Some(FileKind::Include) => {
                let parent = match rel.rsplit_once('/') {
                    Some((dir, _)) => dir.to_string(),
                    None => ".".to_string(),
                };
                push_unique(&mut includes, parent);
            }
            Some(FileKind::Linker) => linker_files.push(rel),
            None => {}
        }
    }

    let mut tools_supported: Vec<String> = linker_files
        .iter()
        .filter_map(|file| guess_tools(file))
        .flatten()
        .map(|tool| (*tool).to_string())
        .collect();
    tools_supported.sort();
    tools_supported.dedup();

    Ok(ScaffoldCommon {
        sources,
        includes,
        linker_file: linker_files.first().cloned().map(|file| vec![file]),
        tools_supported,
        target: Vec::new(),
    })
}

fn skip_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    (name.starts_with('.') && name.len() > 1) || name == "generated_projects" || name == "build"
}

/// Which tools a linker script's extension implies.
fn guess_tools(linker_file: &str) -> Option<&'static [&'static str]> {
    let ext = Path::new(linker_file).extension()?.to_str()?;
    match ext {
        "sct" | "lin" => Some(&["uvision", "uvision5"]),
        "ld" => Some(&["make_gcc_arm"]),
        "icf" => Some(&["iar_arm"]),
        _ => None,
    }
}

fn slash_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|part| match part {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_yaml::to_string(value)?;
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_buckets_by_kind() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main.c");
        touch(dir.path(), "src/util.cpp");
        touch(dir.path(), "inc/board.h");
        touch(dir.path(), "linker/app.ld");
        touch(dir.path(), "README.md");
        touch(dir.path(), ".git/config");
        touch(dir.path(), "generated_projects/make_gcc_arm_x/Makefile");

        let common = scan(dir.path()).unwrap();
        assert_eq!(common.sources, vec!["src/main.c", "src/util.cpp"]);
        assert_eq!(common.includes, vec!["inc"]);
        assert_eq!(common.linker_file, Some(vec!["linker/app.ld".to_string()]));
        assert_eq!(common.tools_supported, vec!["make_gcc_arm"]);
    }

    #[test]
    fn test_run_writes_fragment_and_projects_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.c");
        touch(dir.path(), "app.sct");

        run(dir.path(), Some("demo"), Some("frdm-k64f")).unwrap();

        let fragment = fs::read_to_string(dir.path().join("demo.yaml")).unwrap();
        assert!(fragment.contains("main.c"));
        assert!(fragment.contains("frdm-k64f"));
        assert!(fragment.contains("uvision"));

        let projects = fs::read_to_string(dir.path().join("projects.yaml")).unwrap();
        assert!(projects.contains("demo"));
        assert!(projects.contains("demo.yaml"));
    }

    #[test]
    fn test_run_rejects_empty_tree() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt");
        assert!(run(dir.path(), Some("demo"), None).is_err());
    }
}
