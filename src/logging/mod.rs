//! Tracing subscriber initialization.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the host.
//! The inspector binary writes them to a file so `tail -f` can follow a session.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Why the log sink could not be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The directory holding the log file could not be created.
    #[error("cannot create log directory {path:?}: {source}")]
    CreateDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The path does not end in a UTF-8 file name.
    #[error("log path {0:?} does not name a file")]
    NotAFile(PathBuf),

    /// Another global subscriber is already installed.
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// `RUST_LOG` when set and valid, `info` otherwise.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Directory and file name of `log_path`. A bare file name lives in the working directory.
fn split_log_path(log_path: &Path) -> Result<(&Path, &str), LoggingError> {
    let not_a_file = || LoggingError::NotAFile(log_path.to_path_buf());
    let name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(not_a_file)?;
    let directory = log_path.parent().ok_or_else(not_a_file)?;
    Ok((directory, name))
}

/// Install a global subscriber appending to `log_path`.
///
/// Respects `RUST_LOG`, defaults to `info`. Missing directories are created first.
///
/// # Errors
///
/// [`LoggingError`] if the path has no file name, the directory cannot be created, or a
/// global subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let (directory, name) = split_log_path(log_path)?;

    if !directory.as_os_str().is_empty() {
        std::fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(tracing_appender::rolling::never(directory, name))
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
