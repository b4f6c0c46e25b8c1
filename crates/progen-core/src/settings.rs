//! Process-wide settings store.
//!
//! Settings are built once per run: environment defaults first, then the
//! optional `settings:` block from the projects file. There is no hidden
//! global instance — every operation that needs settings receives a
//! `&Settings` explicitly.
//!
//! Environment variables consulted by [`Settings::from_env`]:
//! - `UV4` — uVision executable (fallback `C:\Keil\UV4\UV4.exe`)
//! - `IARBUILD` — IarBuild directory (fallback the Embedded Workbench 7.0
//!   `common/bin` install path)
//! - `ARM_GCC_PATH` — GCC ARM Embedded bin directory (fallback empty,
//!   meaning resolve from `PATH`)
//! - `PROGEN_DEFINITIONS` — target definitions directory (fallback
//!   `<home>/.progen/definitions`)

use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Default export-location template, relative to the project root.
pub const DEFAULT_EXPORT_LOCATION: &str = "generated_projects/{tool}_{project_name}";

/// Read-mostly configuration shared by exporters and builders.
///
/// Constructed once per run via [`Settings::from_env`], optionally
/// adjusted in-place by [`Settings::apply_overrides`], then immutable.
#[derive(Debug, Clone)]
pub struct Settings {
    tool_paths: BTreeMap<String, String>,
    tool_templates: BTreeMap<String, String>,
    export_location_format: String,
    definitions_dir: PathBuf,
}

impl Settings {
    /// Builds settings from environment variables and documented
    /// fallbacks.
    #[must_use]
    pub fn from_env() -> Self {
        let mut tool_paths = BTreeMap::new();
        tool_paths.insert(
            "uvision".to_string(),
            env::var("UV4").unwrap_or_else(|_| r"C:\Keil\UV4\UV4.exe".to_string()),
        );
        tool_paths.insert(
            "iar".to_string(),
            env::var("IARBUILD").unwrap_or_else(|_| {
                r"C:\Program Files (x86)\IAR Systems\Embedded Workbench 7.0\common\bin".to_string()
            }),
        );
        tool_paths.insert(
            "gcc".to_string(),
            env::var("ARM_GCC_PATH").unwrap_or_default(),
        );

        let definitions_dir = env::var_os("PROGEN_DEFINITIONS").map_or_else(
            || {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".progen")
                    .join("definitions")
            },
            PathBuf::from,
        );

        Self {
            tool_paths,
            tool_templates: BTreeMap::new(),
            export_location_format: DEFAULT_EXPORT_LOCATION.to_string(),
            definitions_dir,
        }
    }

    /// Applies the `settings:` block from a projects file.
    ///
    /// Every override is scalar last-wins. A path override for a tool
    /// without a known executable slot is ignored with a warning.
    pub fn apply_overrides(&mut self, block: &SettingsBlock) {
        for (tool, overrides) in &block.tools {
            if let Some(path) = overrides.path.first() {
                if self.tool_paths.contains_key(tool) {
                    self.tool_paths.insert(tool.clone(), path.clone());
                } else {
                    tracing::warn!("Ignoring path override for unknown tool \"{tool}\"");
                }
            }
            if let Some(template) = overrides.template.first() {
                self.tool_templates.insert(tool.clone(), template.clone());
            }
        }
        if let Some(dir) = block.definitions_dir.first() {
            self.definitions_dir = PathBuf::from(dir);
        }
        if let Some(format) = block.export_dir.first() {
            self.export_location_format = crate::util::normalize_path(format);
        }
    }

    /// Executable path configured for a build tool (`uvision`, `iar`,
    /// `gcc`).
    #[must_use]
    pub fn tool_path(&self, tool: &str) -> Option<&str> {
        self.tool_paths.get(tool).map(String::as_str)
    }

    /// User-supplied template file override for a tool, if any.
    #[must_use]
    pub fn tool_template(&self, tool: &str) -> Option<&str> {
        self.tool_templates.get(tool).map(String::as_str)
    }

    /// Active export-location template.
    #[must_use]
    pub fn export_location_format(&self) -> &str {
        &self.export_location_format
    }

    /// Directory holding target definition YAML files.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }
}

/// The optional `settings:` block of a projects file.
///
/// Scalar values arrive as one-element lists, matching the on-disk YAML
/// shape (`export_dir: [generated/{tool}]`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsBlock {
    /// Per-tool path/template overrides
    #[serde(default)]
    pub tools: BTreeMap<String, ToolOverride>,
    /// Target definitions directory override
    #[serde(default)]
    pub definitions_dir: Vec<String>,
    /// Export-location template override
    #[serde(default)]
    pub export_dir: Vec<String>,
}

/// Path and template overrides for one tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolOverride {
    /// Executable path override
    #[serde(default)]
    pub path: Vec<String>,
    /// Template file override
    #[serde(default)]
    pub template: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_from_yaml(text: &str) -> SettingsBlock {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_env();
        assert_eq!(settings.export_location_format(), DEFAULT_EXPORT_LOCATION);
        assert!(settings.tool_path("uvision").is_some());
        assert!(settings.tool_path("iar").is_some());
        assert!(settings.tool_path("gcc").is_some());
        assert!(settings.tool_path("bogus").is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::from_env();
        let block = block_from_yaml(
            r"
tools:
  uvision:
    path: [/opt/keil/UV4]
    template: [my_uvision.uvproj.tmpl]
definitions_dir: [/srv/definitions]
export_dir: ['projects/{tool}_{project_name}']
",
        );
        settings.apply_overrides(&block);
        assert_eq!(settings.tool_path("uvision"), Some("/opt/keil/UV4"));
        assert_eq!(
            settings.tool_template("uvision"),
            Some("my_uvision.uvproj.tmpl")
        );
        assert_eq!(settings.definitions_dir(), Path::new("/srv/definitions"));
        assert_eq!(
            settings.export_location_format(),
            "projects/{tool}_{project_name}"
        );
    }

    #[test]
    fn test_unknown_tool_path_ignored() {
        let mut settings = Settings::from_env();
        let before = settings.tool_paths.clone();
        let block = block_from_yaml(
            r"
tools:
  frobnicator:
    path: [/usr/bin/frob]
",
        );
        settings.apply_overrides(&block);
        assert_eq!(settings.tool_paths, before);
        assert!(settings.tool_path("frobnicator").is_none());
    }

    #[test]
    fn test_template_override_allowed_for_any_tool() {
        // templates are keyed by exporter id, not executable slot
        let mut settings = Settings::from_env();
        let block = block_from_yaml(
            r"
tools:
  eclipse_make_gcc_arm:
    template: [custom.cproject.tmpl]
",
        );
        settings.apply_overrides(&block);
        assert_eq!(
            settings.tool_template("eclipse_make_gcc_arm"),
            Some("custom.cproject.tmpl")
        );
    }

    #[test]
    fn test_empty_block_is_noop() {
        let mut settings = Settings::from_env();
        let format = settings.export_location_format().to_string();
        settings.apply_overrides(&SettingsBlock::default());
        assert_eq!(settings.export_location_format(), format);
    }
}
