//! The progen project model resolver.
//!
//! This crate turns parsed YAML fragments into one canonical, cross-tool
//! [`ProjectDescription`]:
//!
//! 1. merge every fragment's `common` section (lists extend, scalars
//!    last-wins) and collect `tool_specific` blocks into bundles,
//! 2. resolve the requested tool through the [`tools`] registry and
//!    compute the set of tools the project supports,
//! 3. classify and group sources, split includes into directories and
//!    files, and compute the deterministic output directory,
//! 4. overlay toolchain-family and tool-specific bundles onto the common
//!    view and enforce the linker-file invariant.
//!
//! Resolution either fully succeeds or returns an error with no partial
//! result. The resolver performs no filesystem writes.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod fragment;
mod project;
mod projects_file;
mod resolver;
pub mod tools;

pub use fragment::{Fragment, SourceEntry};
pub use project::{OutputDir, OutputType, ProjectDescription, SourceGroup, ToolSpecBundle};
pub use projects_file::ProjectsFile;
pub use resolver::Resolver;
pub use tools::ToolId;
