//! IAR Embedded Workbench exporter and builder.

use crate::builder::{into_build_result, map_iar_exit, run_logged, BuildResult, Builder};
use crate::context::ExportContext;
use crate::tools::{engine_for, render_file, stage_if_requested};
use crate::{Exporter, GeneratedProject};
use progen_core::Result;
use progen_resolver::ToolId;
use serde_json::json;
use serde_yaml::Value;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Renders an `.ewp` project and the `.eww` workspace wrapping it.
#[derive(Debug)]
pub(crate) struct IarExporter;

fn iar_context(ctx: &ExportContext<'_>) -> Result<serde_json::Value> {
    let config = ctx.target.tool_configuration("iar")?;
    let chip = chip_selection(config).unwrap_or_else(|| ctx.target.name().to_string());
    Ok(json!({
        "name": ctx.project.name,
        "chip": chip,
        "core": ctx.core(),
        "includes": ctx.rel_includes(),
        "defines": ctx.project.macros,
        "groups": ctx.file_groups(),
        "linker_file": ctx.rel_linker_file(),
        "build_dir": ctx.project.build_dir,
    }))
}

/// The chip selection string of the target's `iar` block, tolerating
/// the one-element-list shape.
fn chip_selection(config: &Value) -> Option<String> {
    let state = config.get("OGChipSelectEditMenu")?.get("state")?;
    match state {
        Value::String(s) => Some(s.clone()),
        Value::Sequence(seq) => match seq.first() {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}

impl Exporter for IarExporter {
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject> {
        let engine = engine_for(ctx, ToolId::IarArm, "iar_arm/ewp")?;
        let context = iar_context(ctx)?;
        let mut files = Vec::new();
        stage_if_requested(ctx, &mut files)?;
        let name = &ctx.project.name;
        render_file(&engine, ctx, "iar_arm/ewp", &format!("{name}.ewp"), &context, &mut files)?;
        render_file(&engine, ctx, "iar_arm/eww", &format!("{name}.eww"), &context, &mut files)?;
        Ok(GeneratedProject {
            path: ctx.output_path().to_path_buf(),
            files,
        })
    }
}

/// Invokes `IarBuild` against the exported `.ewp`.
#[derive(Debug)]
pub(crate) struct IarBuilder;

impl Builder for IarBuilder {
    fn build(&self, ctx: &ExportContext<'_>, deadline: Option<Duration>) -> Result<BuildResult> {
        let output = ctx.output_path();
        let name = &ctx.project.name;
        let iar_bin = ctx.settings.tool_path("iar").unwrap_or_default();
        let iarbuild = Path::new(iar_bin).join("IarBuild.exe");
        let log = output.join("build_log.txt");
        let mut command = Command::new(iarbuild);
        command
            .arg(output.join(format!("{name}.ewp")))
            .arg("-build")
            .arg(name);
        let (code, tail) = run_logged("iar", &mut command, &log, deadline)?;
        into_build_result("iar", code, map_iar_exit(code), tail)
    }
}
