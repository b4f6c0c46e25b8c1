//! Typed model of one project YAML fragment.
//!
//! A fragment is one YAML file with a `common` section and optional
//! `tool_specific` blocks; several fragments can compose one named
//! project. Fields are statically declared as either scalar-shaped
//! (one-element list in YAML, last fragment wins) or list-shaped
//! (fragments extend) — the merge never inspects the runtime shape of a
//! value. Unrecognized keys are ignored and logged, never stored.

use progen_core::{util, Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// One parsed project YAML fragment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fragment {
    /// Settings shared by every tool
    #[serde(default)]
    pub common: CommonSection,
    /// Per-tool or per-toolchain overlays, keyed by declared name
    #[serde(default)]
    pub tool_specific: BTreeMap<String, ToolSection>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// The `common` section of a fragment.
///
/// Scalar-shaped fields keep the one-element-list YAML shape
/// (`target: [frdm-k64f]`); the resolver takes the first element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonSection {
    /// Source files, plain or grouped
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Include paths; empty YAML list items arrive as `None`
    #[serde(default)]
    pub includes: Vec<Option<String>>,
    /// Preprocessor symbols
    #[serde(default)]
    pub macros: Vec<Option<String>>,
    /// Target name (scalar)
    #[serde(default)]
    pub target: Vec<String>,
    /// Processor core override (scalar); targets normally supply this
    #[serde(default)]
    pub core: Vec<String>,
    /// Linker command file (scalar)
    #[serde(default)]
    pub linker_file: Vec<String>,
    /// `exe` or `lib` (scalar)
    #[serde(default)]
    pub output_type: Vec<String>,
    /// Tool names this project declares support for
    #[serde(default)]
    pub tools_supported: Vec<String>,
    /// Debugger identifier (scalar)
    #[serde(default)]
    pub debugger: Vec<String>,
    /// Build output directory (scalar)
    #[serde(default)]
    pub build_dir: Vec<String>,
    /// Project-level export-location template override (scalar)
    #[serde(default)]
    pub export_dir: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// One `tool_specific` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolSection {
    /// Additional sources for this tool
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Additional include paths
    #[serde(default)]
    pub includes: Vec<Option<String>>,
    /// Additional preprocessor symbols
    #[serde(default)]
    pub macros: Vec<Option<String>>,
    /// Linker command file (scalar, wins over common)
    #[serde(default)]
    pub linker_file: Vec<String>,
    /// Miscellaneous tool settings, opaque to the resolver
    #[serde(default)]
    pub misc: Mapping,
    /// Template file override (scalar)
    #[serde(default)]
    pub template: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// A `sources:` entry — either a plain path or a named group:
///
/// ```yaml
/// sources:
///   - src/main.cpp
///   - drivers:
///       - hal/uart.c
///       - hal/gpio.c
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    /// Ungrouped path, lands in the `default` group
    Path(String),
    /// Named group mapping to its paths
    Group(BTreeMap<String, Vec<String>>),
}

impl Fragment {
    /// Logs every unrecognized key in the fragment.
    ///
    /// Unknown keys are ignored by design — they are never stored for
    /// later reflection-like access.
    pub fn log_unknown_keys(&self, origin: &Path) {
        for key in self.extra.keys() {
            tracing::warn!("{}: ignoring unrecognized key \"{key}\"", origin.display());
        }
        for key in self.common.extra.keys() {
            tracing::warn!(
                "{}: ignoring unrecognized key \"common.{key}\"",
                origin.display()
            );
        }
        for (tool, section) in &self.tool_specific {
            for key in section.extra.keys() {
                tracing::warn!(
                    "{}: ignoring unrecognized key \"tool_specific.{tool}.{key}\"",
                    origin.display()
                );
            }
        }
    }
}

/// Loads fragment files in order, deduplicating repeated paths.
///
/// # Errors
///
/// A missing or unparsable fragment is fatal for the project being
/// resolved: [`Error::Config`] for a missing file so the message names
/// the projects file that referenced it, [`Error::Yaml`] for parse
/// failures.
pub fn load_fragments(paths: &[String]) -> Result<Vec<Fragment>> {
    let mut seen: Vec<&str> = Vec::new();
    let mut fragments = Vec::new();
    for path in paths {
        if seen.contains(&path.as_str()) {
            continue;
        }
        seen.push(path);
        let path = Path::new(path);
        if !path.exists() {
            return Err(Error::Config {
                message: format!(
                    "the file {} referenced in the projects file doesn't exist",
                    path.display()
                ),
            });
        }
        let fragment: Fragment = util::load_yaml_file(path)?;
        fragment.log_unknown_keys(path);
        fragments.push(fragment);
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Fragment {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_plain_and_grouped_sources() {
        let fragment = parse(
            r"
common:
  sources:
    - src/main.cpp
    - drivers:
        - hal/uart.c
        - hal/gpio.c
  target: [frdm-k64f]
",
        );
        assert_eq!(fragment.common.sources.len(), 2);
        assert!(matches!(fragment.common.sources[0], SourceEntry::Path(_)));
        match &fragment.common.sources[1] {
            SourceEntry::Group(groups) => {
                assert_eq!(groups["drivers"], vec!["hal/uart.c", "hal/gpio.c"]);
            }
            SourceEntry::Path(p) => panic!("expected group, got path {p}"),
        }
        assert_eq!(fragment.common.target, vec!["frdm-k64f"]);
    }

    #[test]
    fn test_parse_tool_specific_block() {
        let fragment = parse(
            r"
tool_specific:
  make_gcc_arm:
    linker_file: [linker/MK64FN1M.ld]
    misc:
      compiler_options: [-fno-exceptions]
",
        );
        let section = &fragment.tool_specific["make_gcc_arm"];
        assert_eq!(section.linker_file, vec!["linker/MK64FN1M.ld"]);
        assert!(section.misc.contains_key(Value::from("compiler_options")));
    }

    #[test]
    fn test_null_list_entries_survive_parsing() {
        // an empty YAML list item is a legal way to comment things out
        let fragment = parse(
            r"
common:
  includes:
    - inc
    -
  macros:
    - DEBUG=1
    -
",
        );
        assert_eq!(fragment.common.includes.len(), 2);
        assert_eq!(fragment.common.includes[1], None);
        assert_eq!(fragment.common.macros[1], None);
    }

    #[test]
    fn test_unknown_keys_are_not_stored_as_fields() {
        let fragment = parse(
            r"
common:
  target: [k64f]
  frobnicate: [yes]
workspace_extras: {}
",
        );
        // parse succeeds; the unknown keys sit in `extra` for logging only
        assert_eq!(fragment.common.target, vec!["k64f"]);
        assert_eq!(fragment.common.extra.len(), 1);
        assert_eq!(fragment.extra.len(), 1);
    }

    #[test]
    fn test_load_fragments_missing_file() {
        let err = load_fragments(&["nonexistent-fragment.yaml".to_string()]).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_fragments_dedupes_paths() {
        use std::fs;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("project.yaml");
        fs::write(&path, "common:\n  target: [k64f]\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        let fragments = load_fragments(&[path.clone(), path]).unwrap();
        assert_eq!(fragments.len(), 1);
    }
}
