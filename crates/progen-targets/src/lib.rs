//! MCU/board target definitions for progen.
//!
//! A target definition is one YAML file of the shape
//! `{mcu: {...}, tool_specific: {...}}` living in the definitions
//! directory. The registry loads every definition once; records are
//! immutable afterwards and borrowed by name — projects reference a
//! target by `target_name`, never by handle, so resolver runs stay
//! independent of registry lifetime.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod registry;
mod target;

pub use registry::TargetRegistry;
pub use target::Target;
