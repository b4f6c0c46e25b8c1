//! Eclipse CDT exporter, layered on the GCC ARM Makefile.
//!
//! Generates `.project` and `.cproject` next to a regular Makefile so
//! the imported project builds with the CDT Makefile builder.

use crate::context::ExportContext;
use crate::tools::gcc_make::makefile_context;
use crate::tools::{engine_for, render_file, stage_if_requested};
use crate::{Exporter, GeneratedProject};
use progen_core::Result;
use progen_resolver::ToolId;
use serde_json::json;

#[derive(Debug)]
pub(crate) struct EclipseExporter;

fn eclipse_context(ctx: &ExportContext<'_>) -> serde_json::Value {
    json!({
        "name": ctx.project.name,
        "includes": ctx.rel_includes(),
        "defines": ctx.project.macros,
        // CDT path token pointing back at the project root, one hop per
        // output directory component
        "parent_loc": format!("PARENT-{}-PROJECT_LOC", ctx.project.output_dir.hops),
    })
}

impl Exporter for EclipseExporter {
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject> {
        let engine = engine_for(ctx, ToolId::EclipseMakeGccArm, "eclipse/cproject")?;
        let context = eclipse_context(ctx);
        let mut files = Vec::new();
        stage_if_requested(ctx, &mut files)?;
        render_file(&engine, ctx, "eclipse/project", ".project", &context, &mut files)?;
        render_file(&engine, ctx, "eclipse/cproject", ".cproject", &context, &mut files)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TemplateEngine;
    use progen_core::Settings;
    use progen_resolver::ProjectDescription;
    use progen_targets::Target;
    use serde_yaml::Mapping;
    use std::collections::BTreeMap;

    #[test]
    fn test_parent_token_counts_output_hops() {
        let mcu: Mapping = serde_yaml::from_str("{core: cortex-m4f}").unwrap();
        let target = Target::from_record("k64f", mcu, BTreeMap::new()).unwrap();
        let settings = Settings::from_env();
        let mut project = ProjectDescription {
            name: "blinky".to_string(),
            ..ProjectDescription::default()
        };
        project.output_dir.path = "generated_projects/eclipse_blinky".to_string();
        project.output_dir.rel_path = "../../".to_string();
        project.output_dir.hops = 2;

        let ctx = ExportContext {
            project: &project,
            target: &target,
            settings: &settings,
        };
        let context = eclipse_context(&ctx);
        assert_eq!(context["parent_loc"], "PARENT-2-PROJECT_LOC");

        let engine = TemplateEngine::new().unwrap();
        let dot_project = engine.render("eclipse/project", &context).unwrap();
        assert!(dot_project.contains("<name>blinky</name>"));
        assert!(dot_project.contains("PARENT-2-PROJECT_LOC"));

        let cproject = engine.render("eclipse/cproject", &context).unwrap();
        assert!(cproject.contains("cdt"));
    }
}
