use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to open a log file for reading.
#[derive(Debug, Error)]
#[error("could not open {path:?}: {source}")]
pub struct SourceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors produced while pulling lines out of a [`crate::source::LineSource`].
#[derive(Debug, Error)]
pub enum LineError {
    /// The line exceeded the configured maximum and was discarded.
    #[error("line {line_number} is too long ({length} bytes, limit {limit})")]
    TooLong {
        line_number: usize,
        length: usize,
        limit: usize,
    },

    /// The underlying stream failed; nothing more will be read from it.
    #[error("unreadable after line {line_number}: {source}")]
    Unreadable {
        line_number: usize,
        #[source]
        source: io::Error,
    },
}

/// Why a single file contributed less than its full content to a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl From<SourceError> for FileFailure {
    fn from(err: SourceError) -> Self {
        FileFailure {
            reason: err.source.to_string(),
            path: err.path,
        }
    }
}
