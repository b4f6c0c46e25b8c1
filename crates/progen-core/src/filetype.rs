//! Extension classification table.
//!
//! Static mapping from file extension to semantic role. Classification is
//! deterministic and total over the configured extension set; anything
//! else maps to `None` and the caller drops the file.
//!
//! # Examples
//!
//! ```
//! use progen_core::{classify, FileKind, FileRole};
//!
//! assert_eq!(classify("cpp"), Some(FileKind::Source(FileRole::Cpp)));
//! assert_eq!(classify("h"), Some(FileKind::Include));
//! assert_eq!(classify("ld"), Some(FileKind::Linker));
//! assert_eq!(classify("txt"), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role of a source file, derived solely from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// C source (`.c`)
    C,
    /// C++ source (`.cpp`, `.cc`)
    Cpp,
    /// Assembly source (`.s`, `.S`, `.asm`)
    Asm,
    /// Pre-built object file (`.o`, `.obj`)
    Object,
    /// Static archive / library (`.a`, `.ar`)
    Archive,
}

impl FileRole {
    /// All roles, in the order exporters list them.
    pub const ALL: [Self; 5] = [Self::C, Self::Cpp, Self::Asm, Self::Object, Self::Archive];

    /// Short key used in template data, matching the vendor-facing
    /// grouping (`c`, `cpp`, `s`, `obj`, `lib`).
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Asm => "s",
            Self::Object => "obj",
            Self::Archive => "lib",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classification result for one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Header file (`.h`, `.hpp`, `.inc`)
    Include,
    /// Buildable or linkable source of the given role
    Source(FileRole),
    /// Linker command file (`.sct`, `.ld`, `.lin`, `.icf`)
    Linker,
}

/// Classifies a file extension into its semantic role.
///
/// The table is fixed:
/// `{h,hpp,inc}` → include, `{s,S,asm}` → assembly, `{c}` → C,
/// `{cpp,cc}` → C++, `{ar,a}` → archive, `{o,obj}` → object,
/// `{sct,ld,lin,icf}` → linker. Everything else returns `None`.
#[must_use]
pub fn classify(extension: &str) -> Option<FileKind> {
    match extension {
        "h" | "hpp" | "inc" => Some(FileKind::Include),
        "s" | "S" | "asm" => Some(FileKind::Source(FileRole::Asm)),
        "c" => Some(FileKind::Source(FileRole::C)),
        "cpp" | "cc" => Some(FileKind::Source(FileRole::Cpp)),
        "ar" | "a" => Some(FileKind::Source(FileRole::Archive)),
        "o" | "obj" => Some(FileKind::Source(FileRole::Object)),
        "sct" | "ld" | "lin" | "icf" => Some(FileKind::Linker),
        _ => None,
    }
}

/// Classifies a path by its final extension.
///
/// Paths without an extension return `None`.
#[must_use]
pub fn classify_path(path: &str) -> Option<FileKind> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() {
        // dotfiles like ".gitignore" have no extension
        return None;
    }
    classify(extension)
}
