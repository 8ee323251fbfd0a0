//! Loading and normalisation of CRDT benchmark results.
//!
//! Benchmark runs compare three implementations (`phoenix`, `vial` and
//! `stdlib`) over increasing operation counts. Each run is written as one
//! JSON file; this crate loads those files and averages them into one series
//! per implementation.
//!
//! # Quick Start
//!
//! ```no_run
//! use crdt_bench_results::{load_and_normalise, PresencePolicy};
//!
//! let results = load_and_normalise("results/", PresencePolicy::Unanimous)?;
//!
//! for series in results.series.values() {
//!     println!("{}: {:?}", series.implementation.label(), series.values);
//! }
//! # Ok::<(), crdt_bench_results::ResultsError>(())
//! ```
//!
//! # Modules
//!
//! - [`result`] - Result document types and per-file series extraction
//! - [`aggregate`] - Averaging of repeated runs
//! - [`io`] - File discovery, loading and report output
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod io;
pub mod markdown;
pub mod result;

pub use aggregate::{normalise, NormalizedResults, NormalizedSeries, PresencePolicy};
pub use error::{Result, ResultsError};
pub use result::{Implementation, ResultFile, ResultRow, SeriesSet, TimingField, TimingRecord};

use std::path::Path;

/// Load every result file under `path` and average them.
///
/// `path` may be a single result file or a directory of `*.json` files.
///
/// # Errors
///
/// Any load or aggregation error aborts the whole run; see [`ResultsError`].
pub fn load_and_normalise(
    path: impl AsRef<Path>,
    policy: PresencePolicy,
) -> Result<NormalizedResults> {
    let sets = io::load_all(path)?;
    normalise(&sets, policy)
}
