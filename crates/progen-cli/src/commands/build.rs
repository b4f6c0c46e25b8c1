//! `build` — export projects and drive the external build tool.

use super::{find_target, Workspace};
use anyhow::{bail, Result};
use colored::Colorize;
use progen_export::{exporter_for, ExportContext};
use progen_resolver::{tools, Resolver, ToolId};
use progen_targets::TargetRegistry;
use std::path::Path;

pub fn run(
    file: &Path,
    project: Option<&str>,
    tool: Option<&str>,
    ignore: &[String],
    copy: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let workspace = Workspace::load(file)?;
    let registry = TargetRegistry::load(workspace.settings.definitions_dir())?;

    let mut failed = 0usize;
    for name in workspace.names(project)? {
        if let Err(err) =
            build_project(&workspace, &registry, &name, tool, ignore, copy, timeout_secs)
        {
            eprintln!("{} {name}: {err:#}", "failed:".red().bold());
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} project(s) failed");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_project(
    workspace: &Workspace,
    registry: &TargetRegistry,
    name: &str,
    tool: Option<&str>,
    ignore: &[String],
    copy: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let fragments = workspace.fragments(name)?;
    let resolver = Resolver::new(name, &workspace.settings);
    let requested: Vec<ToolId> = match tool {
        Some(tool) => vec![tools::resolve_alias(tool)?],
        None => resolver.enumerate_supported(&fragments)?,
    };

    for tool in requested {
        let mut project = resolver.resolve(&fragments, tool, ignore)?;
        project.copy_sources = copy;
        let target = find_target(registry, &project.target_name)?;
        let ctx = ExportContext {
            project: &project,
            target,
            settings: &workspace.settings,
        };
        exporter_for(tool).export(&ctx)?;
        super::generate::build_exported(&ctx, tool, timeout_secs)?;
    }
    Ok(())
}
