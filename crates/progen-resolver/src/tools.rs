//! Static registry of supported tools.
//!
//! A *tool* is a concrete exporter/builder target (the Makefile
//! generator, a specific IDE's project format). Several tools share a
//! *toolchain family* — the underlying compiler/linker technology —
//! which is why YAML settings written for `make_gcc_arm` are picked up
//! by the Eclipse and Sublime Text exporters too.
//!
//! # Examples
//!
//! ```
//! use progen_resolver::tools::{self, ToolId};
//!
//! assert_eq!(tools::resolve_alias("make_gcc").unwrap(), ToolId::MakeGccArm);
//! assert_eq!(ToolId::SublimeMakeGccArm.toolchain(), "make_gcc_arm");
//! ```

use progen_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier of one supported tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    /// Keil uVision 4 (`.uvproj`)
    Uvision,
    /// Keil uVision 5 (`.uvprojx`)
    Uvision5,
    /// IAR Embedded Workbench (`.ewp`/`.eww`)
    IarArm,
    /// GNU Make for GCC ARM Embedded
    MakeGccArm,
    /// Eclipse CDT on top of the GCC ARM Makefile
    EclipseMakeGccArm,
    /// Sublime Text on top of the GCC ARM Makefile
    SublimeMakeGccArm,
}

/// Alias table; values are canonical ids.
const ALIASES: [(&str, &str); 6] = [
    ("iar", "iar_arm"),
    ("make_gcc", "make_gcc_arm"),
    ("gcc_arm", "make_gcc_arm"),
    ("eclipse", "eclipse_make_gcc_arm"),
    ("sublime", "sublime_make_gcc_arm"),
    ("sublime_text", "sublime_make_gcc_arm"),
];

impl ToolId {
    /// Every tool, in registry order.
    pub const ALL: [Self; 6] = [
        Self::Uvision,
        Self::Uvision5,
        Self::IarArm,
        Self::MakeGccArm,
        Self::EclipseMakeGccArm,
        Self::SublimeMakeGccArm,
    ];

    /// Canonical identifier string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uvision => "uvision",
            Self::Uvision5 => "uvision5",
            Self::IarArm => "iar_arm",
            Self::MakeGccArm => "make_gcc_arm",
            Self::EclipseMakeGccArm => "eclipse_make_gcc_arm",
            Self::SublimeMakeGccArm => "sublime_make_gcc_arm",
        }
    }

    /// Names under which a project's YAML can declare settings that this
    /// tool consumes.
    #[must_use]
    pub const fn accepted_names(&self) -> &'static [&'static str] {
        match self {
            Self::Uvision => &["uvision"],
            Self::Uvision5 => &["uvision5", "uvision"],
            Self::IarArm => &["iar_arm"],
            Self::MakeGccArm => &["make_gcc_arm"],
            Self::EclipseMakeGccArm => &["eclipse_make_gcc_arm", "make_gcc_arm"],
            Self::SublimeMakeGccArm => &["sublime_make_gcc_arm", "make_gcc_arm", "sublime"],
        }
    }

    /// Toolchain family this tool builds with.
    #[must_use]
    pub const fn toolchain(&self) -> &'static str {
        match self {
            Self::Uvision | Self::Uvision5 => "uvision",
            Self::IarArm => "iar",
            Self::MakeGccArm | Self::EclipseMakeGccArm | Self::SublimeMakeGccArm => "make_gcc_arm",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        resolve_alias(s)
    }
}

/// Resolves a user-supplied tool name — canonical id or alias — to its
/// canonical [`ToolId`].
///
/// # Errors
///
/// Returns [`Error::UnknownTool`] listing every valid option when the
/// name matches nothing.
pub fn resolve_alias(input: &str) -> Result<ToolId> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == input)
        .map_or(input, |(_, id)| *id);

    ToolId::ALL
        .into_iter()
        .find(|tool| tool.as_str() == canonical)
        .ok_or_else(|| Error::UnknownTool {
            name: input.to_string(),
            valid_options: valid_options(),
        })
}

/// Every concrete tool whose accepted-name list contains `name`.
///
/// Given a toolchain declared in YAML this yields each tool that can
/// consume it: `make_gcc_arm` settings serve the plain Makefile, the
/// Eclipse and the Sublime Text exporters alike.
#[must_use]
pub fn tools_matching_family(name: &str) -> Vec<ToolId> {
    ToolId::ALL
        .into_iter()
        .filter(|tool| tool.accepted_names().contains(&name))
        .collect()
}

/// Sorted list of every canonical id and alias, for error reporting.
#[must_use]
pub fn valid_options() -> Vec<String> {
    let mut options: Vec<String> = ToolId::ALL
        .iter()
        .map(|tool| tool.as_str().to_string())
        .chain(ALIASES.iter().map(|(alias, _)| (*alias).to_string()))
        .collect();
    options.sort();
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_ids() {
        for tool in ToolId::ALL {
            assert_eq!(resolve_alias(tool.as_str()).unwrap(), tool);
        }
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(resolve_alias("iar").unwrap(), ToolId::IarArm);
        assert_eq!(resolve_alias("make_gcc").unwrap(), ToolId::MakeGccArm);
        assert_eq!(resolve_alias("gcc_arm").unwrap(), ToolId::MakeGccArm);
        assert_eq!(resolve_alias("eclipse").unwrap(), ToolId::EclipseMakeGccArm);
        assert_eq!(resolve_alias("sublime").unwrap(), ToolId::SublimeMakeGccArm);
        assert_eq!(
            resolve_alias("sublime_text").unwrap(),
            ToolId::SublimeMakeGccArm
        );
    }

    #[test]
    fn test_unknown_tool_lists_all_options() {
        let err = resolve_alias("bogus_tool").unwrap_err();
        match err {
            Error::UnknownTool { name, valid_options } => {
                assert_eq!(name, "bogus_tool");
                // all six ids plus six aliases
                assert_eq!(valid_options.len(), 12);
                assert!(valid_options.contains(&"uvision5".to_string()));
                assert!(valid_options.contains(&"sublime_text".to_string()));
                assert!(valid_options.windows(2).all(|w| w[0] <= w[1]));
            }
            other => panic!("expected UnknownTool, got {other}"),
        }
    }

    #[test]
    fn test_tools_matching_family() {
        let gcc_consumers = tools_matching_family("make_gcc_arm");
        assert_eq!(
            gcc_consumers,
            vec![
                ToolId::MakeGccArm,
                ToolId::EclipseMakeGccArm,
                ToolId::SublimeMakeGccArm
            ]
        );

        let uvision_consumers = tools_matching_family("uvision");
        assert_eq!(uvision_consumers, vec![ToolId::Uvision, ToolId::Uvision5]);

        assert!(tools_matching_family("gdb").is_empty());
    }

    #[test]
    fn test_toolchain_families() {
        assert_eq!(ToolId::Uvision5.toolchain(), "uvision");
        assert_eq!(ToolId::IarArm.toolchain(), "iar");
        assert_eq!(ToolId::EclipseMakeGccArm.toolchain(), "make_gcc_arm");
    }

    #[test]
    fn test_from_str() {
        let tool: ToolId = "uvision5".parse().unwrap();
        assert_eq!(tool, ToolId::Uvision5);
        assert!("nope".parse::<ToolId>().is_err());
    }
}
