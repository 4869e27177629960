//! Input sources.
//!
//! - [`InputSource`]: where the inspector binary reads article and issue JSON from
//! - [`feed`]: retrying loader for batched feed metadata

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use thiserror::Error;

pub mod feed;

pub use feed::{FeedLoader, FeedSource};

/// Errors reading an input document.
#[derive(Debug, Error)]
pub enum InputError {
    /// No file given and stdin is an interactive terminal.
    #[error("No input source: pass a file path or pipe JSON on stdin")]
    NoInput,

    /// The given file does not exist.
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Reading failed.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A JSON document on disk or on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Read-once file.
    File(PathBuf),
    /// Piped stdin.
    Stdin,
}

impl InputSource {
    /// Read the whole document.
    ///
    /// # Errors
    ///
    /// `InputError::Io` for I/O errors.
    pub fn read_document(&self) -> Result<String, InputError> {
        match self {
            InputSource::File(path) => Ok(std::fs::read_to_string(path)?),
            InputSource::Stdin => read_all(std::io::stdin().lock()),
        }
    }
}

fn read_all(mut reader: impl Read) -> Result<String, InputError> {
    let mut document = String::new();
    reader.read_to_string(&mut document)?;
    Ok(document)
}

/// Pick the source for an optional path argument.
///
/// `None` or `-` selects stdin, which must be piped.
///
/// # Errors
///
/// `InputError::FileNotFound` for a missing file, `InputError::NoInput` for an interactive
/// stdin.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            if path.exists() {
                Ok(InputSource::File(path))
            } else {
                Err(InputError::FileNotFound { path })
            }
        }
        _ if std::io::stdin().is_terminal() => Err(InputError::NoInput),
        _ => Ok(InputSource::Stdin),
    }
}
