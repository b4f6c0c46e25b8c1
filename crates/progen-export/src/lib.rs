//! Tool-native project file exporters and builders.
//!
//! Each supported tool gets an [`Exporter`] that renders its project
//! files from the resolved description and, where the tool can build
//! from the command line, a [`Builder`] that invokes it and maps the
//! exit code. Dispatch is by [`ToolId`] through [`exporter_for`] and
//! [`builder_for`].
//!
//! Export is idempotent: re-exporting an unchanged project rewrites the
//! same files byte for byte.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod builder;
pub mod context;
pub mod engine;
mod tools;
pub mod writer;

use progen_core::Result;
use progen_resolver::ToolId;
use std::path::PathBuf;

pub use builder::{BuildResult, BuildStatus, Builder};
pub use context::{ExportContext, MiscOptions};
pub use engine::TemplateEngine;

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProject {
    /// Output directory of the project
    pub path: PathBuf,
    /// Every file written, generated and staged alike
    pub files: Vec<PathBuf>,
}

/// Per-tool export adapter.
pub trait Exporter {
    /// Renders the tool's project files into the output directory.
    fn export(&self, ctx: &ExportContext<'_>) -> Result<GeneratedProject>;
}

/// The exporter for one tool.
#[must_use]
pub fn exporter_for(tool: ToolId) -> Box<dyn Exporter> {
    match tool {
        ToolId::Uvision => Box::new(tools::uvision::UvisionExporter::V4),
        ToolId::Uvision5 => Box::new(tools::uvision::UvisionExporter::V5),
        ToolId::IarArm => Box::new(tools::iar::IarExporter),
        ToolId::MakeGccArm => Box::new(tools::gcc_make::MakeGccArmExporter),
        ToolId::EclipseMakeGccArm => Box::new(tools::eclipse::EclipseExporter),
        ToolId::SublimeMakeGccArm => Box::new(tools::sublime::SublimeExporter),
    }
}

/// The builder for one tool. The make-based tools all build through
/// GNU make against the exported Makefile.
#[must_use]
pub fn builder_for(tool: ToolId) -> Box<dyn Builder> {
    match tool {
        ToolId::Uvision | ToolId::Uvision5 => Box::new(tools::uvision::UvisionBuilder),
        ToolId::IarArm => Box::new(tools::iar::IarBuilder),
        ToolId::MakeGccArm | ToolId::EclipseMakeGccArm | ToolId::SublimeMakeGccArm => {
            Box::new(tools::gcc_make::MakeBuilder)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_an_exporter_and_builder() {
        for tool in ToolId::ALL {
            let _exporter = exporter_for(tool);
            let _builder = builder_for(tool);
        }
    }
}
