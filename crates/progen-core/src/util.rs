//! Partial-format and path utilities.
//!
//! Output locations are described by templates like
//! `generated_projects/{tool}_{project_name}` and resolved with partial
//! formatting: known placeholders are substituted, unknown ones are left
//! literally in place. Path arithmetic here is purely lexical — nothing
//! touches the filesystem, which keeps output-directory computation
//! deterministic and testable.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Substitutes `{name}` placeholders from `vars`, leaving unknown
/// placeholders literally in place. Never fails.
///
/// # Examples
///
/// ```
/// use progen_core::util::partial_format;
///
/// let out = partial_format(
///     "generated_projects/{tool}_{project_name}",
///     &[("tool", "uvision"), ("project_name", "blinky")],
/// );
/// assert_eq!(out, "generated_projects/uvision_blinky");
///
/// // unresolved placeholders survive untouched
/// let out = partial_format("{tool}_{board}", &[("tool", "iar_arm")]);
/// assert_eq!(out, "iar_arm_{board}");
/// ```
#[must_use]
pub fn partial_format(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                // unterminated brace, keep the remainder as-is
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lexically normalizes a relative path: collapses `.` segments, repeated
/// separators and resolvable `..` segments.
///
/// # Examples
///
/// ```
/// use progen_core::util::normalize_path;
///
/// assert_eq!(normalize_path("src//./main.c"), "src/main.c");
/// assert_eq!(normalize_path("a/b/../c"), "a/c");
/// assert_eq!(normalize_path("./"), ".");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(&"..") | None) {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    match (absolute, parts.is_empty()) {
        (true, _) => format!("/{}", parts.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => parts.join("/"),
    }
}

/// Computes the way back from a normalized relative directory to its
/// starting point: one `..` per path component, with a trailing
/// separator, plus the hop count.
///
/// Exporters prefix every project-root-relative path with this value so
/// generated files reference sources correctly from inside the output
/// directory; the hop count feeds Eclipse-style relative-path tokens.
///
/// # Examples
///
/// ```
/// use progen_core::util::relative_up;
///
/// assert_eq!(relative_up("generated_projects/uvision_blinky"), ("../../".to_string(), 2));
/// assert_eq!(relative_up("."), ("./".to_string(), 0));
/// ```
#[must_use]
pub fn relative_up(normalized: &str) -> (String, usize) {
    if normalized.is_empty() || normalized == "." {
        return ("./".to_string(), 0);
    }
    let hops = normalized.split('/').filter(|s| !s.is_empty()).count();
    ("../".repeat(hops), hops)
}

/// Reads and deserializes one YAML file.
pub fn load_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Appends `value` to `list` unless an equal entry is already present.
/// Keeps first-seen insertion order.
pub fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.iter().any(|existing| *existing == value) {
        list.push(value);
    }
}
