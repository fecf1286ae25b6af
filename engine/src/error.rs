//! Error types for the dedup engine.
//!
//! Setup and configuration failures abort a run. Parse and empty-file
//! failures are recovered per file by the stage that hits them: the file is
//! skipped, logged, and recorded in the run report.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum DedupError {
    /// An input, work, or output location could not be read or written.
    #[error("Setup failed for {}: {source}", .path.display())]
    Setup {
        /// Location that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run configuration is unreadable or inconsistent.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// What is wrong with it.
        reason: String,
    },

    /// An input file is not valid N-Triples, or still contains blank nodes.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An input file parsed but held no statements.
    #[error("File contains no statements: {}", .path.display())]
    EmptyFile {
        /// Offending file.
        path: PathBuf,
    },
}

impl DedupError {
    /// Wraps an I/O error on `path` as a fatal setup error.
    pub fn setup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DedupError::Setup {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error only affects a single input file and the
    /// stage can skip that file and continue.
    #[must_use]
    pub fn is_per_file(&self) -> bool {
        matches!(self, DedupError::Parse { .. } | DedupError::EmptyFile { .. })
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, DedupError>;
