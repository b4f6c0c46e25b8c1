//! CLI subcommand implementations.

pub mod build;
pub mod create;
pub mod generate;
pub mod tools;

mod common;

pub(crate) use common::{find_target, Workspace};
