//! Template engine for project file rendering.
//!
//! Wraps Handlebars with the built-in per-tool templates pre-registered.
//! Strict mode is on; every adapter populates its context completely, so
//! a missing variable means a broken context and should fail loudly.

use handlebars::Handlebars;
use progen_core::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Built-in template names and sources, registered at construction.
const BUILTIN_TEMPLATES: [(&str, &str); 8] = [
    ("make_gcc_arm/makefile", include_str!("../templates/makefile.hbs")),
    ("uvision/uvproj", include_str!("../templates/uvision.uvproj.hbs")),
    (
        "uvision5/uvprojx",
        include_str!("../templates/uvision5.uvprojx.hbs"),
    ),
    ("iar_arm/ewp", include_str!("../templates/iar.ewp.hbs")),
    ("iar_arm/eww", include_str!("../templates/iar.eww.hbs")),
    (
        "eclipse/project",
        include_str!("../templates/eclipse.project.hbs"),
    ),
    (
        "eclipse/cproject",
        include_str!("../templates/eclipse.cproject.hbs"),
    ),
    (
        "sublime/project",
        include_str!("../templates/sublime.sublime-project.hbs"),
    ),
];

/// Handlebars wrapper with the built-in project templates registered.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates an engine with every built-in template registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a built-in template fails to
    /// register; this indicates a packaging defect, not user error.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        for (name, source) in BUILTIN_TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| Error::Template {
                    message: format!("failed to register built-in template \"{name}\": {e}"),
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Renders a registered template with the given context.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::Template {
                message: format!("rendering \"{template_name}\" failed: {e}"),
            })
    }

    /// Registers a user-supplied template file under `name`, shadowing
    /// the built-in of the same name if present.
    pub fn register_template_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| Error::Template {
                message: format!("failed to register template {}: {e}", path.display()),
            })
    }
}
