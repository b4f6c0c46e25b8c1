//! Per-tool export and build adapters.

pub(crate) mod eclipse;
pub(crate) mod gcc_make;
pub(crate) mod iar;
pub(crate) mod sublime;
pub(crate) mod uvision;

use crate::context::ExportContext;
use crate::engine::TemplateEngine;
use crate::writer;
use progen_core::Result;
use progen_resolver::ToolId;
use std::path::{Path, PathBuf};

/// Creates the engine for one export, applying the user template
/// override for `tool` when configured.
pub(crate) fn engine_for(ctx: &ExportContext<'_>, tool: ToolId, template_name: &str) -> Result<TemplateEngine<'static>> {
    let mut engine = TemplateEngine::new()?;
    if let Some(path) = ctx.template_override(tool) {
        engine.register_template_file(template_name, &path)?;
    }
    Ok(engine)
}

/// Renders one template into the output directory.
pub(crate) fn render_file(
    engine: &TemplateEngine<'_>,
    ctx: &ExportContext<'_>,
    template_name: &str,
    file_name: &str,
    context: &serde_json::Value,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let rendered = engine.render(template_name, context)?;
    let path = ctx.output_path().join(file_name);
    writer::write_file(&path, &rendered)?;
    tracing::info!("generated {}", path.display());
    files.push(path);
    Ok(())
}

/// Stages the project's referenced files under `<output>/copy/` when
/// the export was asked to be self-contained.
pub(crate) fn stage_if_requested(
    ctx: &ExportContext<'_>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    if !ctx.project.copy_sources {
        return Ok(());
    }
    let mut paths: Vec<String> = ctx
        .project
        .all_sources()
        .into_iter()
        .map(str::to_string)
        .collect();
    paths.extend(ctx.project.include_files.iter().cloned());
    if let Some(linker) = &ctx.project.linker_file {
        paths.push(linker.clone());
    }
    let staged = writer::stage_sources(Path::new("."), ctx.output_path(), paths)?;
    files.extend(staged);
    Ok(())
}
