//! Shared plumbing for the subcommands.

use anyhow::{Context, Result};
use progen_core::Settings;
use progen_resolver::{fragment, Fragment, ProjectsFile};
use progen_targets::{Target, TargetRegistry};
use std::io::IsTerminal;
use std::path::Path;

/// A loaded projects file together with the effective settings.
#[derive(Debug)]
pub(crate) struct Workspace {
    projects: ProjectsFile,
    pub(crate) settings: Settings,
}

impl Workspace {
    /// Loads the projects file and folds its `settings:` block into the
    /// environment defaults.
    pub(crate) fn load(file: &Path) -> Result<Self> {
        let projects = ProjectsFile::load(file)
            .with_context(|| format!("loading projects file {}", file.display()))?;
        let mut settings = Settings::from_env();
        if let Some(block) = &projects.settings {
            settings.apply_overrides(block);
        }
        Ok(Self { projects, settings })
    }

    /// The requested project, or every declared project when no name
    /// was given.
    pub(crate) fn names(&self, only: Option<&str>) -> Result<Vec<String>> {
        match only {
            Some(name) => {
                self.projects.fragment_paths(name)?;
                Ok(vec![name.to_string()])
            }
            None => Ok(self.projects.names()),
        }
    }

    /// Loads and parses the fragments of one project.
    pub(crate) fn fragments(&self, name: &str) -> Result<Vec<Fragment>> {
        let paths = self.projects.fragment_paths(name)?;
        Ok(fragment::load_fragments(paths)?)
    }
}

/// Looks up a target, prompting interactively when the alias is
/// ambiguous and a terminal is attached. Batch runs fail instead of
/// guessing.
pub(crate) fn find_target<'a>(registry: &'a TargetRegistry, alias: &str) -> Result<&'a Target> {
    match registry.find(alias) {
        Ok(target) => Ok(target),
        Err(progen_core::Error::AmbiguousTarget { alias, candidates })
            if std::io::stderr().is_terminal() =>
        {
            let index = dialoguer::Select::new()
                .with_prompt(format!("Multiple targets contain \"{alias}\", pick one"))
                .items(&candidates)
                .default(0)
                .interact()
                .context("target selection aborted")?;
            registry
                .get(&candidates[index])
                .context("selected target disappeared from the registry")
        }
        Err(err) => Err(err.into()),
    }
}
