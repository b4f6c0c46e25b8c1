//! `tools` — list the tools each project can be exported for.

use super::Workspace;
use anyhow::Result;
use progen_resolver::Resolver;
use std::path::Path;

pub fn run(file: &Path, project: Option<&str>) -> Result<()> {
    let workspace = Workspace::load(file)?;
    for name in workspace.names(project)? {
        let fragments = workspace.fragments(&name)?;
        let resolver = Resolver::new(&name, &workspace.settings);
        let supported = resolver.enumerate_supported(&fragments)?;
        println!("{name}:");
        for tool in supported {
            println!("  {tool}");
        }
    }
    Ok(())
}
