//! GCC ARM Embedded Makefile exporter and the shared make builder.

use crate::builder::{into_build_result, map_make_exit, run_logged, BuildResult, Builder};
use crate::context::{normalize_core, ExportContext, MiscOptions};
use crate::tools::{engine_for, render_file, stage_if_requested};
use crate::{Exporter, GeneratedProject};
use progen_core::{FileRole, Result};
use progen_resolver::{OutputType, ToolId};
use serde_json::json;
use std::process::Command;
use std::time::Duration;

/// Renders a `Makefile` driving `arm-none-eabi-gcc`.
#[derive(Debug)]
pub(crate) struct MakeGccArmExporter;

/// Template context shared by every make-based exporter.
pub(crate) fn makefile_context(ctx: &ExportContext<'_>) -> serde_json::Value {
    let misc = MiscOptions::from_mapping(&ctx.project.misc);
    let toolchain_bin = match ctx.settings.tool_path("gcc") {
        Some("") | None => String::new(),
        Some(path) => format!("{}/", path.trim_end_matches('/')),
    };
    json!({
        "name": ctx.project.name,
        "core": normalize_core(ctx.core()),
        "fpu": ctx.target.fpu(),
        "fpu_convention": ctx.target.fpu_convention().unwrap_or("soft"),
        "instruction_mode": misc.instruction_mode.as_deref().unwrap_or("thumb"),
        "includes": ctx.rel_includes(),
        "macros": ctx.project.macros,
        "src_c": ctx.rel_sources_of(FileRole::C),
        "src_cpp": ctx.rel_sources_of(FileRole::Cpp),
        "src_s": ctx.rel_sources_of(FileRole::Asm),
        "objects": ctx.rel_sources_of(FileRole::Object),
        "archives": ctx.rel_sources_of(FileRole::Archive),
        "libraries": misc.libraries,
        "linker_file": ctx.rel_linker_file(),
        "build_dir": ctx.project.build_dir,
        "toolchain_bin": toolchain_bin,
        "optimization": misc.optimization.as_deref().unwrap_or("O0"),
        "c_standard": misc.c_standard.as_deref().unwrap_or("gnu99"),
        "cc_standard": misc.cc_standard.as_deref().unwrap_or("gnu++98"),
        "compiler_options": misc.compiler_options,
        "linker_options": misc.linker_options,
        "is_library": ctx.project.output_type == OutputType::Lib,
    })
}

impl Exporter for MakeGccArmExporter {
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject> {
        let engine = engine_for(ctx, ToolId::MakeGccArm, "make_gcc_arm/makefile")?;
        let mut files = Vec::new();
        stage_if_requested(ctx, &mut files)?;
        render_file(
            &engine,
            ctx,
            "make_gcc_arm/makefile",
            "Makefile",
            &makefile_context(ctx),
            &mut files,
        )?;
        Ok(GeneratedProject {
            path: ctx.output_path().to_path_buf(),
            files,
        })
    }
}

/// Runs GNU make against an exported Makefile.
///
/// Shared by the plain Makefile, Eclipse and Sublime Text tools.
#[derive(Debug)]
pub(crate) struct MakeBuilder;

impl Builder for MakeBuilder {
    fn build(&self, ctx: &ExportContext<'_>, deadline: Option<Duration>) -> Result<BuildResult> {
        let output = ctx.output_path();
        let log = output.join("build_log.txt");
        let mut command = Command::new("make");
        command.arg("-C").arg(output).arg("all");
        let (code, tail) = run_logged("make", &mut command, &log, deadline)?;
        into_build_result("make", code, map_make_exit(code), tail)
    }
}
