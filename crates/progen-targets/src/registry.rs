//! The target registry: loads definition files and resolves fuzzy names.

use crate::Target;
use progen_core::{util, Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// On-disk shape of one definition file.
#[derive(Debug, Deserialize)]
struct TargetRecord {
    #[serde(default)]
    mcu: Mapping,
    #[serde(default)]
    tool_specific: BTreeMap<String, Value>,
}

/// Read-only collection of every target definition in a directory.
///
/// Loaded once per run; safely shareable by reference afterwards.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    /// Loads every `*.yaml` definition in `directory` (non-recursive).
    ///
    /// A file that cannot be read or parsed, or that lacks `mcu.core`,
    /// is logged and skipped — one broken definition must not take down
    /// the whole registry. Files are visited in name order so the
    /// registry contents are deterministic.
    ///
    /// # Errors
    ///
    /// Fails only when the directory itself cannot be enumerated.
    pub fn load(directory: &Path) -> Result<Self> {
        tracing::debug!("Loading target definitions from {}", directory.display());

        let entries = fs::read_dir(directory).map_err(|source| Error::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        paths.sort();

        let mut targets = Vec::new();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match util::load_yaml_file::<TargetRecord>(&path) {
                Ok(record) => match Target::from_record(stem, record.mcu, record.tool_specific) {
                    Ok(target) => targets.push(target),
                    Err(err) => tracing::error!("Skipping {}: {err}", path.display()),
                },
                Err(err) => tracing::error!("Skipping {}: {err}", path.display()),
            }
        }

        tracing::debug!("Loaded {} target definitions", targets.len());
        Ok(Self { targets })
    }

    /// All loaded targets.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Exact lookup by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name() == name)
    }

    /// Fuzzy lookup: case-insensitive substring match against every
    /// target name.
    ///
    /// # Errors
    ///
    /// - No match: [`Error::UnknownTarget`] carrying every known name.
    /// - Several matches: [`Error::AmbiguousTarget`] carrying all of
    ///   them. The registry never picks a candidate on its own; the CLI
    ///   decides whether to prompt or fail.
    pub fn find(&self, alias: &str) -> Result<&Target> {
        let needle = alias.to_lowercase();
        let matches: Vec<&Target> = self
            .targets
            .iter()
            .filter(|t| t.name().to_lowercase().contains(&needle))
            .collect();

        match matches.as_slice() {
            [single] => Ok(single),
            [] => Err(Error::UnknownTarget {
                alias: alias.to_string(),
                candidates: self.targets.iter().map(|t| t.name().to_string()).collect(),
            }),
            several => Err(Error::AmbiguousTarget {
                alias: alias.to_string(),
                candidates: several.iter().map(|t| t.name().to_string()).collect(),
            }),
        }
    }
}
