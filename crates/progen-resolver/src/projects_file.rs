//! The top-level projects file.
//!
//! Maps project names to their fragment files and optionally carries a
//! `settings:` block:
//!
//! ```yaml
//! projects:
//!   blinky:
//!     - records/blinky.yaml
//!     - records/k64f_sdk.yaml
//! settings:
//!   export_dir: [generated/{tool}_{project_name}]
//! ```

use progen_core::{util, Error, Result, SettingsBlock};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed projects file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectsFile {
    /// Project name → fragment paths, in declaration order per project
    #[serde(default)]
    pub projects: BTreeMap<String, Vec<String>>,
    /// Optional settings overrides
    #[serde(default)]
    pub settings: Option<SettingsBlock>,
}

impl ProjectsFile {
    /// Loads and parses a projects file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file cannot be read, [`Error::Yaml`] when
    /// it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        util::load_yaml_file(path)
    }

    /// Fragment paths of one named project.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming every declared project when `name` is
    /// not one of them.
    pub fn fragment_paths(&self, name: &str) -> Result<&[String]> {
        self.projects
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Config {
                message: format!(
                    "You specified an invalid project name \"{name}\". Known projects: {}",
                    self.names().join(", ")
                ),
            })
    }

    /// Every declared project name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }
}
