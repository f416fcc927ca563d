//! Tracing subscriber setup
//!
//! The TUI owns the terminal, so interactive sessions log to a file in the
//! XDG data directory. One-shot mode logs to stderr, keeping stdout clean for
//! JSON output. `RUST_LOG` overrides the configured level.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::{project_dirs, APP_NAME};

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error
    Stderr,
    /// Append to a file, creating parent directories as needed
    File(PathBuf),
}

/// Default log file for interactive sessions
pub fn default_log_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join(format!("{}.log", APP_NAME)))
}

/// Opens `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global tracing subscriber
///
/// `default_level` is used when `RUST_LOG` is unset. Installing twice is a
/// no-op.
pub fn init(target: &LogTarget, default_level: &str) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_log_file_mentions_app_name() {
        if let Some(path) = default_log_file() {
            assert!(path.to_string_lossy().ends_with("persona-router.log"));
        }
        // Passes when no home directory is available (e.g. in CI)
    }

    #[test]
    fn test_open_log_file_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("logs").join("app.log");

        open_log_file(&path).expect("Should open log file");

        assert!(path.exists(), "Log file should be created");
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("app.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
