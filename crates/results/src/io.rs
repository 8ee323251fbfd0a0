//! I/O operations for benchmark results.
//!
//! This module locates result files on disk, loads them into
//! [`SeriesSet`]s, and writes normalised reports back out.

use crate::aggregate::NormalizedResults;
use crate::error::{Result, ResultsError};
use crate::markdown;
use crate::result::{ResultFile, SeriesSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of result files picked up in directory mode.
pub const RESULT_EXTENSION: &str = "json";

/// Resolve `path` to the list of result files it names.
///
/// A file is returned as-is. A directory yields its `*.json` entries,
/// non-recursively, sorted by path. Hidden entries (leading `.`) are skipped.
///
/// # Errors
///
/// Returns [`ResultsError::Io`] if the path cannot be inspected and
/// [`ResultsError::EmptyInput`] if a directory holds no result files.
pub fn discover_result_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| ResultsError::io(path, e))?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| ResultsError::io(path, e))? {
        let entry = entry.map_err(|e| ResultsError::io(path, e))?;
        let candidate = entry.path();
        if is_hidden(&candidate) {
            continue;
        }
        let is_result = candidate
            .extension()
            .map(|ext| ext == RESULT_EXTENSION)
            .unwrap_or(false);
        if is_result && candidate.is_file() {
            files.push(candidate);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ResultsError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    debug!(directory = %path.display(), files = files.len(), "Discovered result files");
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Load a single result file.
///
/// # Errors
///
/// Returns [`ResultsError::Io`] if the file cannot be read and
/// [`ResultsError::Malformed`] if it is not a valid result document.
pub fn load_series_set(path: impl AsRef<Path>) -> Result<SeriesSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ResultsError::io(path, e))?;
    let file =
        ResultFile::from_json(&content).map_err(|e| ResultsError::malformed(path, e.to_string()))?;
    let set = SeriesSet::from_result_file(path, &file)?;

    debug!(
        file = %path.display(),
        rows = set.row_count(),
        implementations = ?set.implementations().collect::<Vec<_>>(),
        "Loaded result file"
    );
    Ok(set)
}

/// Load every result file named by `path`, in discovery order.
pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<SeriesSet>> {
    discover_result_files(path)?
        .iter()
        .map(load_series_set)
        .collect()
}

/// Write normalised results to a pretty-printed JSON file.
pub fn write_normalized_json(results: &NormalizedResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(results)?;
    fs::write(path, json).map_err(|e| ResultsError::io(path, e))
}

/// Render normalised results as pretty-printed JSON.
pub fn to_json(results: &NormalizedResults) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Write the markdown summary file.
pub fn write_summary(results: &NormalizedResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let summary = markdown::generate_summary(results);
    fs::write(path, summary).map_err(|e| ResultsError::io(path, e))
}
