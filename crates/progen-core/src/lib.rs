//! Core types, settings and errors for the progen project generator.
//!
//! This crate provides the foundation used across the progen workspace:
//! - The error hierarchy shared by every crate
//! - The extension classification table mapping file extensions to roles
//! - The process-wide settings store (environment defaults + YAML overrides)
//! - Partial-format and path utilities used when computing output locations

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
pub mod filetype;
pub mod settings;
pub mod util;

pub use error::{Error, Result};
pub use filetype::{classify, classify_path, FileKind, FileRole};
pub use settings::{Settings, SettingsBlock};
