//! Keil uVision 4/5 project exporter and builder.

use crate::builder::{into_build_result, map_uvision_exit, run_logged, BuildResult, Builder};
use crate::context::{debugger_dll, ExportContext};
use crate::tools::{engine_for, render_file, stage_if_requested};
use crate::{Exporter, GeneratedProject};
use progen_core::{Error, Result};
use progen_resolver::ToolId;
use serde_json::json;
use serde_yaml::Value;
use std::process::Command;
use std::time::Duration;

/// Exporter for both uVision generations; they share the context and
/// differ in schema and file extension.
#[derive(Debug, Clone, Copy)]
pub(crate) enum UvisionExporter {
    /// uVision 4, `.uvproj`
    V4,
    /// uVision 5, `.uvprojx`
    V5,
}

impl UvisionExporter {
    const fn tool(self) -> ToolId {
        match self {
            Self::V4 => ToolId::Uvision,
            Self::V5 => ToolId::Uvision5,
        }
    }

    const fn template(self) -> &'static str {
        match self {
            Self::V4 => "uvision/uvproj",
            Self::V5 => "uvision5/uvprojx",
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::V4 => "uvproj",
            Self::V5 => "uvprojx",
        }
    }
}

fn uvision_context(ctx: &ExportContext<'_>) -> Result<serde_json::Value> {
    let config = ctx.target.tool_configuration("uvision")?;
    let device = nested_string(config, &["TargetOption", "Device"])
        .unwrap_or_else(|| ctx.target.name().to_string());
    Ok(json!({
        "name": ctx.project.name,
        "device": device,
        "vendor": ctx.target.vendor(),
        "core": ctx.core(),
        "defines": ctx.project.macros.join(", "),
        "includes": ctx.rel_includes().join(";"),
        "groups": ctx.file_groups(),
        "scatter_file": ctx.rel_linker_file(),
        "debugger_dll": debugger_dll(&ctx.project.debugger),
        "build_dir": ctx.project.build_dir,
    }))
}

/// Digs a string out of a nested YAML mapping, tolerating the
/// one-element-list shape at the leaf.
fn nested_string(value: &Value, keys: &[&str]) -> Option<String> {
    let mut current = value;
    for key in keys {
        current = current.get(*key)?;
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Sequence(seq) => match seq.first() {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}

impl Exporter for UvisionExporter {
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject> {
        let engine = engine_for(ctx, self.tool(), self.template())?;
        let context = uvision_context(ctx)?;
        let mut files = Vec::new();
        stage_if_requested(ctx, &mut files)?;
        let file_name = format!("{}.{}", ctx.project.name, self.extension());
        render_file(&engine, ctx, self.template(), &file_name, &context, &mut files)?;
        Ok(GeneratedProject {
            path: ctx.output_path().to_path_buf(),
            files,
        })
    }
}

/// Invokes `UV4 -b` against the exported project file.
#[derive(Debug)]
pub(crate) struct UvisionBuilder;

impl Builder for UvisionBuilder {
    fn build(&self, ctx: &ExportContext<'_>, deadline: Option<Duration>) -> Result<BuildResult> {
        let output = ctx.output_path();
        let name = &ctx.project.name;
        // uVision 5 projects take priority when both generations were
        // exported into the same directory
        let project_file = ["uvprojx", "uvproj"]
            .iter()
            .map(|ext| output.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::Config {
                message: format!(
                    "no uVision project file for \"{name}\" in {}; run generate first",
                    output.display()
                ),
            })?;

        let uv4 = ctx.settings.tool_path("uvision").unwrap_or("UV4");
        let log = output.join("build_log.txt");
        let mut command = Command::new(uv4);
        command
            .arg("-b")
            .arg(&project_file)
            .arg("-j0")
            .arg("-o")
            .arg("build_log.txt");
        let (code, tail) = run_logged("uvision", &mut command, &log, deadline)?;
        into_build_result("uvision", code, map_uvision_exit(code), tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TemplateEngine;
    use progen_core::{FileRole, Settings};
    use progen_resolver::{ProjectDescription, SourceGroup};
    use progen_targets::Target;
    use serde_yaml::Mapping;
    use std::collections::BTreeMap;

    fn target_with_uvision_block() -> Target {
        let mcu: Mapping =
            serde_yaml::from_str("{core: cortex-m4f, vendor: Freescale}").unwrap();
        let mut tools = BTreeMap::new();
        tools.insert(
            "uvision".to_string(),
            serde_yaml::from_str::<Value>("{TargetOption: {Device: MK64FN1M0VLL12}}").unwrap(),
        );
        Target::from_record("frdm-k64f", mcu, tools).unwrap()
    }

    fn sample_project() -> ProjectDescription {
        let mut group = SourceGroup::default();
        group.add(FileRole::C, "src/main.c".to_string());
        group.add(FileRole::Asm, "src/startup.s".to_string());
        let mut project = ProjectDescription {
            name: "blinky".to_string(),
            includes: vec!["inc".to_string()],
            macros: vec!["BOARD=1".to_string(), "DEBUG".to_string()],
            linker_file: Some("linker/app.sct".to_string()),
            target_name: "frdm-k64f".to_string(),
            debugger: "cmsis-dap".to_string(),
            build_dir: "build".to_string(),
            ..ProjectDescription::default()
        };
        project.output_dir.rel_path = "../../".to_string();
        project.source_groups.insert("default".to_string(), group);
        project
    }

    #[test]
    fn test_context_extracts_device_from_target_block() {
        let target = target_with_uvision_block();
        let settings = Settings::from_env();
        let project = sample_project();
        let ctx = ExportContext {
            project: &project,
            target: &target,
            settings: &settings,
        };
        let context = uvision_context(&ctx).unwrap();
        assert_eq!(context["device"], "MK64FN1M0VLL12");
        assert_eq!(context["defines"], "BOARD=1, DEBUG");
        assert_eq!(context["includes"], "../../inc");
    }

    #[test]
    fn test_target_without_uvision_block_is_unsupported() {
        let mcu: Mapping = serde_yaml::from_str("{core: cortex-m3}").unwrap();
        let mut tools = BTreeMap::new();
        tools.insert("iar".to_string(), Value::Null);
        let target = Target::from_record("lpc1768", mcu, tools).unwrap();
        let settings = Settings::from_env();
        let project = sample_project();
        let ctx = ExportContext {
            project: &project,
            target: &target,
            settings: &settings,
        };
        let err = uvision_context(&ctx).unwrap_err();
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_both_generations_render_groups_and_type_codes() {
        let target = target_with_uvision_block();
        let settings = Settings::from_env();
        let project = sample_project();
        let ctx = ExportContext {
            project: &project,
            target: &target,
            settings: &settings,
        };
        let context = uvision_context(&ctx).unwrap();
        let engine = TemplateEngine::new().unwrap();

        for template in ["uvision/uvproj", "uvision5/uvprojx"] {
            let rendered = engine.render(template, &context).unwrap();
            assert!(rendered.contains("MK64FN1M0VLL12"));
            assert!(rendered.contains("<FileType>1</FileType>"), "{template}");
            assert!(rendered.contains("<FileType>2</FileType>"), "{template}");
            assert!(rendered.contains("main.c"));
            assert!(rendered.contains("CMSIS_AGDI.dll"));
        }
    }
}
