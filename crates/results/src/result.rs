//! Benchmark result types.
//!
//! This module describes the on-disk result document and the per-file
//! [`SeriesSet`] extracted from it. Two schema versions exist in the wild:
//! older files record timings under `time`, newer ones under
//! `time_per_op_usec`. Which one a file uses is decided by looking at the
//! first row only.

use crate::error::{Result, ResultsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the benchmarked implementations.
///
/// Variants are declared in drawing order, so ordered maps keyed by
/// `Implementation` iterate phoenix, vial, stdlib.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    /// The existing general-purpose CRDT.
    Phoenix,
    /// The specialised CRDT.
    Vial,
    /// Plain standard library collections.
    Stdlib,
}

impl Implementation {
    /// Every implementation, in drawing order.
    pub const ALL: [Implementation; 3] = [
        Implementation::Phoenix,
        Implementation::Vial,
        Implementation::Stdlib,
    ];

    /// Key used for this implementation in result documents.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Phoenix => "phoenix",
            Self::Vial => "vial",
            Self::Stdlib => "stdlib",
        }
    }

    /// Short chart label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Phoenix => "Existing CRDT",
            Self::Vial => "Specialised CRDT",
            Self::Stdlib => "StdLib",
        }
    }

    /// Long-form name used in reports.
    pub fn long_label(&self) -> &'static str {
        match self {
            Self::Phoenix => "Existing CRDT",
            Self::Vial => "Specialised CRDT",
            Self::Stdlib => "Standard Library",
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Nested timing record for one implementation in one row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    /// Timing in the older schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    /// Timing in the newer schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_op_usec: Option<f64>,
}

/// The field a file stores its timings under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingField {
    /// `time_per_op_usec`
    TimePerOpUsec,
    /// `time`
    Time,
}

impl TimingField {
    /// Schema shapes in the order they are tried.
    pub const PRIORITY: [TimingField; 2] = [TimingField::TimePerOpUsec, TimingField::Time];

    /// Pick the first known field present in `record`.
    pub fn detect(record: &TimingRecord) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|field| field.extract(record).is_some())
    }

    /// Read this field from `record`.
    pub fn extract(&self, record: &TimingRecord) -> Option<f64> {
        match self {
            Self::TimePerOpUsec => record.time_per_op_usec,
            Self::Time => record.time,
        }
    }

    /// JSON key of this field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TimePerOpUsec => "time_per_op_usec",
            Self::Time => "time",
        }
    }
}

/// A single measurement row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Number of operations performed in this measurement.
    pub operations: u64,
    /// Standard library timings, if benchmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdlib: Option<TimingRecord>,
    /// Specialised CRDT timings, if benchmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vial: Option<TimingRecord>,
    /// Existing CRDT timings, if benchmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phoenix: Option<TimingRecord>,
}

impl ResultRow {
    /// Timing record for `implementation` in this row.
    pub fn record(&self, implementation: Implementation) -> Option<&TimingRecord> {
        match implementation {
            Implementation::Phoenix => self.phoenix.as_ref(),
            Implementation::Vial => self.vial.as_ref(),
            Implementation::Stdlib => self.stdlib.as_ref(),
        }
    }
}

/// A complete result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    /// Measurement rows in file order.
    pub results: Vec<ResultRow>,
}

impl ResultFile {
    /// Parse a result document from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

/// Series extracted from one result file.
///
/// `operations` has one entry per row; every present implementation has a
/// timing sequence of the same length. Absent implementations have no entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSet {
    source: PathBuf,
    operations: Vec<u64>,
    timings: BTreeMap<Implementation, Vec<f64>>,
}

impl SeriesSet {
    /// Build a series set from already extracted sequences.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::Malformed`] if a timing sequence does not match
    /// the length of `operations`.
    pub fn from_parts(
        source: impl Into<PathBuf>,
        operations: Vec<u64>,
        timings: BTreeMap<Implementation, Vec<f64>>,
    ) -> Result<Self> {
        let source = source.into();
        for (implementation, values) in &timings {
            if values.len() != operations.len() {
                return Err(ResultsError::malformed(
                    &source,
                    format!(
                        "`{}` has {} timings for {} rows",
                        implementation,
                        values.len(),
                        operations.len()
                    ),
                ));
            }
        }
        Ok(Self {
            source,
            operations,
            timings,
        })
    }

    /// Extract series from a parsed result document.
    ///
    /// Presence of each implementation is decided by the first row alone. The
    /// timing field found there is then read from every row.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::Malformed`] if a later row lacks the field the
    /// first row established.
    pub fn from_result_file(source: impl Into<PathBuf>, file: &ResultFile) -> Result<Self> {
        let source = source.into();
        let operations: Vec<u64> = file.results.iter().map(|row| row.operations).collect();
        let mut timings = BTreeMap::new();

        let Some(first) = file.results.first() else {
            return Ok(Self {
                source,
                operations,
                timings,
            });
        };

        for implementation in Implementation::ALL {
            let Some(field) = first.record(implementation).and_then(TimingField::detect) else {
                continue;
            };

            let values = file
                .results
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    row.record(implementation)
                        .and_then(|record| field.extract(record))
                        .ok_or_else(|| {
                            ResultsError::malformed(
                                &source,
                                format!(
                                    "row {}: `{}` has no `{}` value",
                                    index,
                                    implementation,
                                    field.key()
                                ),
                            )
                        })
                })
                .collect::<Result<Vec<f64>>>()?;

            timings.insert(implementation, values);
        }

        Ok(Self {
            source,
            operations,
            timings,
        })
    }

    /// File this set was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Operation counts, one per row.
    pub fn operations(&self) -> &[u64] {
        &self.operations
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.operations.len()
    }

    /// Timings for `implementation`, or `None` if it was not benchmarked.
    pub fn timings(&self, implementation: Implementation) -> Option<&[f64]> {
        self.timings.get(&implementation).map(Vec::as_slice)
    }

    /// Implementations present in this file, in drawing order.
    pub fn implementations(&self) -> impl Iterator<Item = Implementation> + '_ {
        self.timings.keys().copied()
    }
}
