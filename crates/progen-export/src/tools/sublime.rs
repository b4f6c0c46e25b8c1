//! Sublime Text exporter, layered on the GCC ARM Makefile.

use crate::context::ExportContext;
use crate::tools::gcc_make::makefile_context;
use crate::tools::{engine_for, render_file, stage_if_requested};
use crate::{Exporter, GeneratedProject};
use progen_core::Result;
use progen_resolver::ToolId;
use serde_json::json;

#[derive(Debug)]
pub(crate) struct SublimeExporter;

impl Exporter for SublimeExporter {
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject> {
        let engine = engine_for(ctx, ToolId::SublimeMakeGccArm, "sublime/project")?;
        let rel_path = ctx.rel_prefix();
        let context = json!({
            "name": ctx.project.name,
            "folder": if rel_path.is_empty() { "." } else { rel_path },
        });
        let mut files = Vec::new();
        stage_if_requested(ctx, &mut files)?;
        let file_name = format!("{}.sublime-project", ctx.project.name);
        render_file(&engine, ctx, "sublime/project", &file_name, &context, &mut files)?;
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

    #[test]
    fn test_project_json_shape() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine
            .render(
                "sublime/project",
                &json!({"name": "blinky", "folder": "../../"}),
            )
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["folders"][0]["path"], "../../");
        assert_eq!(parsed["build_systems"][0]["name"], "blinky");
    }
}
