//! `generate` — resolve projects and export tool-native project files.

use super::{find_target, Workspace};
use anyhow::{bail, Result};
use colored::Colorize;
use progen_export::{builder_for, exporter_for, BuildStatus, ExportContext};
use progen_resolver::{tools, Resolver, ToolId};
use progen_targets::TargetRegistry;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Runs the generate command.
///
/// Projects are processed sequentially; one project's failure is
/// reported and does not abort the others. The command fails if any
/// project failed.
#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &Path,
    project: Option<&str>,
    tool: Option<&str>,
    ignore: &[String],
    copy: bool,
    build: bool,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let workspace = Workspace::load(file)?;
    let registry = TargetRegistry::load(workspace.settings.definitions_dir())?;

    let mut failed = 0usize;
    for name in workspace.names(project)? {
        if let Err(err) = generate_project(
            &workspace,
            &registry,
            &name,
            tool,
            ignore,
            copy,
            build,
            timeout_secs,
        ) {
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
fn generate_project(
    workspace: &Workspace,
    registry: &TargetRegistry,
    name: &str,
    tool: Option<&str>,
    ignore: &[String],
    copy: bool,
    build: bool,
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
        let generated = exporter_for(tool).export(&ctx)?;
        println!(
            "{} {name} for {tool} -> {}",
            "generated".green().bold(),
            generated.path.display()
        );
        if build {
            build_exported(&ctx, tool, timeout_secs)?;
        }
    }
    Ok(())
}

/// Builds an already exported project, printing the mapped outcome.
pub(crate) fn build_exported(
    ctx: &ExportContext<'_>,
    tool: ToolId,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let deadline = timeout_secs.map(Duration::from_secs);
    let result = builder_for(tool).build(ctx, deadline)?;
    match result.status {
        BuildStatus::Success => {
            println!("{} {} build succeeded", "built".green().bold(), ctx.project.name);
        }
        BuildStatus::Warning => {
            println!(
                "{} {} build finished with warnings",
                "built".yellow().bold(),
                ctx.project.name
            );
        }
        BuildStatus::Failure => unreachable!("failures are returned as errors"),
    }
    info!("build log:\n{}", result.log);
    Ok(())
}
