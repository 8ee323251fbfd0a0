//! Error types for loading and normalising benchmark results.

use crate::result::Implementation;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or aggregating result files.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// The path could not be opened or read.
    #[error("Failed to read {}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document does not have the expected shape.
    #[error("Malformed result file {}: {reason}", path.display())]
    Malformed {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Files being averaged together have differing row counts.
    #[error("Shape mismatch in {}: expected {expected} rows, found {found}", path.display())]
    ShapeMismatch {
        /// File whose row count disagrees with the first file.
        path: PathBuf,
        /// Row count of the first loaded file.
        expected: usize,
        /// Row count of the offending file.
        found: usize,
    },

    /// Nothing to aggregate.
    #[error("No result files to aggregate{}", location(path))]
    EmptyInput {
        /// Location that was searched, empty when none applies.
        path: PathBuf,
    },

    /// An implementation is present in some files but not in others.
    #[error(
        "Implementation `{implementation}` is present in {present} file(s) but absent from {absent}"
    )]
    MixedPresence {
        /// Implementation with disagreeing presence.
        implementation: Implementation,
        /// Number of files carrying it.
        present: usize,
        /// Number of files lacking it.
        absent: usize,
    },

    /// Normalised results could not be serialised.
    #[error("Failed to serialise results: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ResultsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResultsError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ResultsError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn location(path: &std::path::Path) -> String {
    if path.as_os_str().is_empty() {
        String::new()
    } else {
        format!(" in {}", path.display())
    }
}

/// Result type for result-file operations.
pub type Result<T> = std::result::Result<T, ResultsError>;
