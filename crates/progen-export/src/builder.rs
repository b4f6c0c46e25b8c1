//! External build tool invocation.
//!
//! Builders run the vendor tool against a previously exported project
//! and map its raw exit code through a per-tool table instead of
//! treating every nonzero code as fatal. The default waits indefinitely
//! for the child; a deadline polls it and kills on expiry. Failed
//! builds are never retried.

use crate::context::ExportContext;
use progen_core::{Error, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

/// How long the build log tail kept in [`BuildResult::log`] may get.
const LOG_TAIL_BYTES: usize = 4096;

/// Poll interval while waiting on a child with a deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Mapped outcome of one external build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The tool reported success
    Success,
    /// Built, but the tool reported warnings
    Warning,
    /// The build failed
    Failure,
}

/// Result of one build invocation.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Mapped exit status
    pub status: BuildStatus,
    /// Tail of the tool's own output
    pub log: String,
}

/// Per-tool build adapter.
pub trait Builder {
    /// Builds an exported project.
    ///
    /// `deadline` of `None` waits indefinitely, matching the vendor
    /// tools' own behavior.
    fn build(&self, ctx: &ExportContext<'_>, deadline: Option<Duration>) -> Result<BuildResult>;
}

/// Runs one external tool with its output captured to `log_path`,
/// returning the raw exit code and the log tail.
///
/// The log file is written to disk regardless of outcome so failed
/// builds stay diagnosable.
pub(crate) fn run_logged(
    tool: &str,
    command: &mut Command,
    log_path: &Path,
    deadline: Option<Duration>,
) -> Result<(i32, String)> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let log_file = fs::File::create(log_path).map_err(|source| Error::Io {
        path: log_path.to_path_buf(),
        source,
    })?;
    let stderr_file = log_file.try_clone().map_err(|source| Error::Io {
        path: log_path.to_path_buf(),
        source,
    })?;

    tracing::info!("running {tool}: {command:?}");
    let mut child = command
        .stdout(log_file)
        .stderr(stderr_file)
        .spawn()
        .map_err(|source| Error::Io {
            path: command.get_program().into(),
            source,
        })?;

    let status = match deadline {
        None => child.wait().map_err(|source| Error::Io {
            path: log_path.to_path_buf(),
            source,
        })?,
        Some(limit) => {
            let started = Instant::now();
            loop {
                match child.try_wait().map_err(|source| Error::Io {
                    path: log_path.to_path_buf(),
                    source,
                })? {
                    Some(status) => break status,
                    None if started.elapsed() >= limit => {
                        // best effort; the child may have exited already
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::Timeout {
                            operation: tool.to_string(),
                            duration_secs: limit.as_secs(),
                        });
                    }
                    None => std::thread::sleep(POLL_INTERVAL),
                }
            }
        }
    };

    let code = status.code().unwrap_or(-1);
    Ok((code, log_tail(log_path)))
}

/// Finalizes one build: a mapped failure becomes
/// [`Error::ExternalToolFailure`] carrying the raw exit code, success
/// and warnings come back as a [`BuildResult`].
pub(crate) fn into_build_result(
    tool: &str,
    code: i32,
    status: BuildStatus,
    log: String,
) -> Result<BuildResult> {
    if status == BuildStatus::Failure {
        return Err(Error::ExternalToolFailure {
            tool: tool.to_string(),
            status: code,
            log,
        });
    }
    Ok(BuildResult { status, log })
}

/// Last [`LOG_TAIL_BYTES`] of the build log, lossily decoded.
fn log_tail(log_path: &Path) -> String {
    let Ok(bytes) = fs::read(log_path) else {
        return String::new();
    };
    let start = bytes.len().saturating_sub(LOG_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

/// Exit-code mapping for the GNU make family: `0` success, `1`
/// "targets not already up to date" warning, anything else failure.
pub(crate) const fn map_make_exit(code: i32) -> BuildStatus {
    match code {
        0 => BuildStatus::Success,
        1 => BuildStatus::Warning,
        _ => BuildStatus::Failure,
    }
}

/// Exit-code mapping for `UV4 -b`: `0` success, `1` warnings, the
/// documented error codes and everything unexpected map to failure.
pub(crate) fn map_uvision_exit(code: i32) -> BuildStatus {
    match code {
        0 => BuildStatus::Success,
        1 => BuildStatus::Warning,
        2 => {
            tracing::error!("uVision: errors or fatal errors");
            BuildStatus::Failure
        }
        3 => {
            tracing::error!("uVision: fatal errors");
            BuildStatus::Failure
        }
        11 => {
            tracing::error!("uVision: cannot open project file for writing");
            BuildStatus::Failure
        }
        12 => {
            tracing::error!("uVision: device with given name not found");
            BuildStatus::Failure
        }
        13 => {
            tracing::error!("uVision: error writing project file");
            BuildStatus::Failure
        }
        15 => {
            tracing::error!("uVision: error reading import XML file");
            BuildStatus::Failure
        }
        other => {
            tracing::error!("uVision: unexpected exit code {other}");
            BuildStatus::Failure
        }
    }
}

/// Exit-code mapping for IarBuild: `0` success, anything else failure.
pub(crate) const fn map_iar_exit(code: i32) -> BuildStatus {
    match code {
        0 => BuildStatus::Success,
        _ => BuildStatus::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_exit_table() {
        assert_eq!(map_make_exit(0), BuildStatus::Success);
        assert_eq!(map_make_exit(1), BuildStatus::Warning);
        assert_eq!(map_make_exit(2), BuildStatus::Failure);
        assert_eq!(map_make_exit(127), BuildStatus::Failure);
    }

    #[test]
    fn test_uvision_exit_table() {
        assert_eq!(map_uvision_exit(0), BuildStatus::Success);
        assert_eq!(map_uvision_exit(1), BuildStatus::Warning);
        for code in [2, 3, 11, 12, 13, 15, 42] {
            assert_eq!(map_uvision_exit(code), BuildStatus::Failure);
        }
    }

    #[test]
    fn test_failure_becomes_external_tool_error() {
        let err =
            into_build_result("make", 2, BuildStatus::Failure, "boom".to_string()).unwrap_err();
        assert!(matches!(
            err,
            Error::ExternalToolFailure { status: 2, .. }
        ));

        let warned = into_build_result("make", 1, BuildStatus::Warning, String::new()).unwrap();
        assert_eq!(warned.status, BuildStatus::Warning);
    }

    #[test]
    fn test_iar_exit_table() {
        assert_eq!(map_iar_exit(0), BuildStatus::Success);
        assert_eq!(map_iar_exit(1), BuildStatus::Failure);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_logged_captures_output() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("build_log.txt");
        let (code, tail) = run_logged(
            "sh",
            Command::new("sh").args(["-c", "echo compiling; exit 0"]),
            &log,
            None,
        )
        .unwrap();
        assert_eq!(code, 0);
        assert!(tail.contains("compiling"));
        assert!(log.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_logged_reports_exit_code() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("build_log.txt");
        let (code, _) = run_logged(
            "sh",
            Command::new("sh").args(["-c", "exit 2"]),
            &log,
            None,
        )
        .unwrap();
        assert_eq!(code, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_logged_deadline_kills_child() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("build_log.txt");
        let err = run_logged(
            "sh",
            Command::new("sh").args(["-c", "sleep 30"]),
            &log,
            Some(Duration::from_millis(200)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[test]
    fn test_run_logged_missing_executable() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("build_log.txt");
        let err = run_logged(
            "definitely-not-a-tool",
            &mut Command::new("definitely-not-a-tool-7f3a"),
            &log,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
