//! Filesystem side of export.
//!
//! All writes go through [`write_file`] so the handle is closed before
//! the build step re-opens the generated files. Re-exporting an
//! unchanged project rewrites the same bytes to the same paths; nothing
//! accumulates.

use progen_core::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes one generated file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = fs::File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Stages project files under `<output>/copy/`, preserving their
/// project-root-relative layout.
///
/// Used by `--copy` exports so the generated project is self-contained.
/// Paths are resolved against `root` (the project root) and must stay
/// project-root-relative. Returns the staged paths. Only the explicitly
/// referenced files travel; directories named in `includes` are not
/// walked.
pub fn stage_sources(
    root: &Path,
    output: &Path,
    paths: impl IntoIterator<Item = impl AsRef<str>>,
) -> Result<Vec<PathBuf>> {
    let copy_root = output.join("copy");
    let mut staged = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let destination = copy_root.join(path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(root.join(path), &destination).map_err(|source| Error::Io {
            path: root.join(path),
            source,
        })?;
        staged.push(destination);
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/deep/Makefile");

        write_file(&path, "all:\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "all:\n");

        // overwrite with identical content, no duplication or error
        write_file(&path, "all:\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "all:\n");

        // changed content replaces the file wholesale
        write_file(&path, "clean:\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "clean:\n");
    }

    #[test]
    fn test_stage_sources_preserves_layout() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.c"), "int main(void) { return 0; }\n").unwrap();

        let output = dir.path().join("generated");
        let staged = stage_sources(dir.path(), &output, ["src/main.c"]).unwrap();
        assert_eq!(staged, vec![output.join("copy/src/main.c")]);
        assert!(output.join("copy/src/main.c").is_file());
    }

    #[test]
    fn test_stage_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("generated");
        let err = stage_sources(dir.path(), &output, ["no/such/file.c"]).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
