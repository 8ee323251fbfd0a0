//! Normalisation of repeated benchmark runs.
//!
//! Each loaded file is one run. Runs are aligned strictly by row index and
//! reduced with an element-wise arithmetic mean.

use crate::error::{Result, ResultsError};
use crate::result::{Implementation, SeriesSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// How to treat an implementation present in some runs but not others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresencePolicy {
    /// Every run must agree on presence, otherwise aggregation fails.
    #[default]
    Unanimous,
    /// Average only over the runs that carry the implementation.
    PresentOnly,
}

impl std::str::FromStr for PresencePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "unanimous" => Ok(Self::Unanimous),
            "present_only" => Ok(Self::PresentOnly),
            other => Err(format!("unknown presence policy: {}", other)),
        }
    }
}

/// Mean timings of one implementation across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    /// Implementation these timings belong to.
    pub implementation: Implementation,
    /// Mean timing per row.
    pub values: Vec<f64>,
    /// Number of runs that contributed.
    pub runs: usize,
}

/// Output of [`normalise`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResults {
    /// Mean operation count per row.
    pub operations: Vec<f64>,
    /// One entry per implementation present in the input.
    pub series: BTreeMap<Implementation, NormalizedSeries>,
    /// Files that were averaged.
    pub sources: Vec<PathBuf>,
}

impl NormalizedResults {
    /// Number of rows in every series.
    pub fn row_count(&self) -> usize {
        self.operations.len()
    }

    /// Normalised series for `implementation`, if present.
    pub fn get(&self, implementation: Implementation) -> Option<&NormalizedSeries> {
        self.series.get(&implementation)
    }
}

/// Average a collection of runs into one series per implementation.
///
/// # Errors
///
/// - [`ResultsError::EmptyInput`] when `sets` is empty.
/// - [`ResultsError::ShapeMismatch`] when runs differ in row count.
/// - [`ResultsError::MixedPresence`] under [`PresencePolicy::Unanimous`] when
///   runs disagree on whether an implementation was benchmarked.
pub fn normalise(sets: &[SeriesSet], policy: PresencePolicy) -> Result<NormalizedResults> {
    let first = sets.first().ok_or_else(|| ResultsError::EmptyInput {
        path: PathBuf::new(),
    })?;

    let expected = first.row_count();
    for set in sets {
        if set.row_count() != expected {
            return Err(ResultsError::ShapeMismatch {
                path: set.source().to_path_buf(),
                expected,
                found: set.row_count(),
            });
        }
    }

    let operations: Vec<Vec<f64>> = sets
        .iter()
        .map(|set| set.operations().iter().map(|&ops| ops as f64).collect())
        .collect();
    let operations = column_mean(operations.iter().map(Vec::as_slice), expected);

    let mut series = BTreeMap::new();
    for implementation in Implementation::ALL {
        let columns: Vec<&[f64]> = sets
            .iter()
            .filter_map(|set| set.timings(implementation))
            .collect();

        if columns.is_empty() {
            debug!(%implementation, "Implementation absent from every run");
            continue;
        }

        if columns.len() != sets.len() && policy == PresencePolicy::Unanimous {
            return Err(ResultsError::MixedPresence {
                implementation,
                present: columns.len(),
                absent: sets.len() - columns.len(),
            });
        }

        let runs = columns.len();
        series.insert(
            implementation,
            NormalizedSeries {
                implementation,
                values: column_mean(columns.into_iter(), expected),
                runs,
            },
        );
    }

    info!(
        runs = sets.len(),
        rows = expected,
        implementations = series.len(),
        "Normalised benchmark runs"
    );

    Ok(NormalizedResults {
        operations,
        series,
        sources: sets.iter().map(|set| set.source().to_path_buf()).collect(),
    })
}

/// Element-wise mean of equal-length columns.
fn column_mean<'a>(columns: impl Iterator<Item = &'a [f64]>, len: usize) -> Vec<f64> {
    let mut sums = vec![0.0; len];
    let mut count = 0usize;
    for column in columns {
        for (sum, value) in sums.iter_mut().zip(column) {
            *sum += value;
        }
        count += 1;
    }
    if count > 0 {
        for sum in &mut sums {
            *sum /= count as f64;
        }
    }
    sums
}
