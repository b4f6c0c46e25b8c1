//! A single MCU/board target record.

use progen_core::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// One target definition, immutable once loaded.
///
/// `fpu` derives from the core identifier: cores ending in `f`
/// (e.g. `cortex-m4f`) carry a floating point unit, and only those
/// targets expose an `fpu_convention`.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    supported_tools: Vec<String>,
    core: String,
    vendor: String,
    fpu: bool,
    fpu_convention: Option<String>,
    mcu: Mapping,
    tool_specific: BTreeMap<String, Value>,
}

impl Target {
    /// Builds a target from a parsed definition record.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] when the record has no `mcu.core` —
    /// a target without a core is unusable by every exporter and must
    /// not be registered.
    pub fn from_record(name: &str, mcu: Mapping, tool_specific: BTreeMap<String, Value>) -> Result<Self> {
        let core = mcu_scalar(&mcu, "core").ok_or_else(|| Error::Config {
            message: format!("target definition \"{name}\" is missing mcu.core"),
        })?;
        let vendor = mcu_scalar(&mcu, "vendor").unwrap_or_default();
        let fpu = core.ends_with('f');
        let fpu_convention = if fpu {
            mcu_scalar(&mcu, "fpu_convention")
        } else {
            None
        };

        Ok(Self {
            name: name.to_string(),
            supported_tools: tool_specific.keys().cloned().collect(),
            core,
            vendor,
            fpu,
            fpu_convention,
            mcu,
            tool_specific,
        })
    }

    /// Target name (the definition file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tools this definition provides a configuration block for.
    #[must_use]
    pub fn supported_tools(&self) -> &[String] {
        &self.supported_tools
    }

    /// Core identifier, e.g. `cortex-m4f`.
    #[must_use]
    pub fn core(&self) -> &str {
        &self.core
    }

    /// Silicon vendor, possibly empty.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Whether the core has a floating point unit.
    #[must_use]
    pub const fn fpu(&self) -> bool {
        self.fpu
    }

    /// Float ABI convention, present only for FPU cores.
    #[must_use]
    pub fn fpu_convention(&self) -> Option<&str> {
        self.fpu_convention.as_deref()
    }

    /// The raw `mcu` mapping of the definition.
    #[must_use]
    pub fn device_configuration(&self) -> &Mapping {
        &self.mcu
    }

    /// Tool-specific configuration block for `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedTool`] when the definition has no
    /// block for the requested tool.
    pub fn tool_configuration(&self, tool: &str) -> Result<&Value> {
        self.tool_specific.get(tool).ok_or_else(|| Error::UnsupportedTool {
            tool: tool.to_string(),
            supported: self.supported_tools.clone(),
        })
    }
}

/// Extracts a string field from the `mcu` mapping, tolerating both the
/// scalar and the one-element-list YAML shapes seen in definition repos.
fn mcu_scalar(mcu: &Mapping, key: &str) -> Option<String> {
    match mcu.get(Value::from(key))? {
        Value::String(s) => Some(s.clone()),
        Value::Sequence(seq) => match seq.first() {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}
