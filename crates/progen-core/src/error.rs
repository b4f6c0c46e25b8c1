//! Error types for the progen workspace.
//!
//! A single error hierarchy is shared by every crate so that the CLI can
//! report any failure uniformly. Lookup errors carry the full candidate
//! lists so callers can present alternatives instead of guessing.
//!
//! # Examples
//!
//! ```
//! use progen_core::{Error, Result};
//!
//! fn pick_tool(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::Config {
//!             message: "tool name cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = pick_tool("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the progen workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete project configuration.
    ///
    /// Fatal for the single project being resolved; a multi-project run
    /// continues with the remaining projects.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A YAML file failed to parse.
    #[error("Failed to parse YAML file {path}")]
    Yaml {
        /// Path of the offending file
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// A filesystem operation failed.
    #[error("I/O error on {path}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The requested tool name does not resolve to anything in the tool
    /// registry, not even through an alias.
    #[error("The tool name \"{name}\" is not valid. Choose from: {}", valid_options.join(", "))]
    UnknownTool {
        /// The name the user asked for
        name: String,
        /// Every canonical id and alias the registry accepts, sorted
        valid_options: Vec<String>,
    },

    /// The tool exists but is not declared by the project's YAML files,
    /// or a target definition provides no configuration block for it.
    #[error("The tool \"{tool}\" is not supported here. Supported: {}", supported.join(", "))]
    UnsupportedTool {
        /// The requested tool
        tool: String,
        /// Tools that would have worked
        supported: Vec<String>,
    },

    /// An executable project resolved without any linker file.
    #[error("No linker file found for project \"{project}\"")]
    MissingLinkerFile {
        /// The project being resolved
        project: String,
    },

    /// No target name contains the given alias.
    #[error("\"{alias}\" must be contained in one of: {}", candidates.join(", "))]
    UnknownTarget {
        /// The alias the user asked for
        alias: String,
        /// Every known target name
        candidates: Vec<String>,
    },

    /// More than one target name contains the given alias. The caller
    /// decides whether to prompt or fail; the core never picks one.
    #[error("Multiple targets contain \"{alias}\": {}", candidates.join(", "))]
    AmbiguousTarget {
        /// The alias the user asked for
        alias: String,
        /// All matching target names
        candidates: Vec<String>,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    Template {
        /// Description of the templating failure
        message: String,
    },

    /// An external vendor tool exited with a failure status.
    ///
    /// Never retried automatically; vendor tools are not safe to rerun
    /// blindly.
    #[error("{tool} exited with status {status}: {log}")]
    ExternalToolFailure {
        /// The external tool that was invoked
        tool: String,
        /// Mapped or raw exit status
        status: i32,
        /// Tail of the external tool's own output
        log: String,
    },

    /// An external tool exceeded the caller-supplied deadline.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Seconds before the deadline expired
        duration_secs: u64,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Yaml { .. })
    }

    /// Returns `true` if this is a tool lookup failure of either kind.
    #[must_use]
    pub const fn is_tool_error(&self) -> bool {
        matches!(self, Self::UnknownTool { .. } | Self::UnsupportedTool { .. })
    }

    /// Returns `true` if this is a target lookup failure of either kind.
    #[must_use]
    pub const fn is_target_error(&self) -> bool {
        matches!(self, Self::UnknownTarget { .. } | Self::AmbiguousTarget { .. })
    }

    /// Returns `true` if an external vendor tool failed or timed out.
    #[must_use]
    pub const fn is_external_failure(&self) -> bool {
        matches!(self, Self::ExternalToolFailure { .. } | Self::Timeout { .. })
    }
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_detection() {
        let err = Error::Config {
            message: "missing field".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_tool_error());
    }

    #[test]
    fn test_unknown_tool_lists_options() {
        let err = Error::UnknownTool {
            name: "bogus_tool".to_string(),
            valid_options: vec!["iar_arm".to_string(), "uvision".to_string()],
        };
        let display = format!("{err}");
        assert!(display.contains("bogus_tool"));
        assert!(display.contains("iar_arm"));
        assert!(display.contains("uvision"));
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_ambiguous_target_lists_candidates() {
        let err = Error::AmbiguousTarget {
            alias: "k64".to_string(),
            candidates: vec!["frdm-k64f".to_string(), "twr-k64f120m".to_string()],
        };
        let display = format!("{err}");
        assert!(display.contains("frdm-k64f"));
        assert!(display.contains("twr-k64f120m"));
        assert!(err.is_target_error());
    }

    #[test]
    fn test_missing_linker_display() {
        let err = Error::MissingLinkerFile {
            project: "blinky".to_string(),
        };
        assert!(format!("{err}").contains("blinky"));
    }

    #[test]
    fn test_external_failure_detection() {
        let err = Error::ExternalToolFailure {
            tool: "make".to_string(),
            status: 2,
            log: "errors".to_string(),
        };
        assert!(err.is_external_failure());
        assert!(!err.is_config_error());

        let err = Error::Timeout {
            operation: "make all".to_string(),
            duration_secs: 30,
        };
        assert!(err.is_external_failure());
    }
}
