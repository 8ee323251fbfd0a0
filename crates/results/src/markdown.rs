//! Markdown output generation for normalised results.
//!
//! The summary is a plain table: one row per operation count, one column per
//! implementation that was benchmarked.

use crate::aggregate::NormalizedResults;
use std::fmt::Write;

/// Generate a markdown summary from normalised results.
pub fn generate_summary(results: &NormalizedResults) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Runs averaged: {}", results.sources.len()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Mean time per operation").unwrap();
    writeln!(output).unwrap();

    let mut header = String::from("| Operations |");
    let mut divider = String::from("|-----------:|");
    for series in results.series.values() {
        write!(header, " {} |", series.implementation.long_label()).unwrap();
        write!(divider, "{}:|", "-".repeat(series.implementation.long_label().len() + 1)).unwrap();
    }
    writeln!(output, "{}", header).unwrap();
    writeln!(output, "{}", divider).unwrap();

    for (row, operations) in results.operations.iter().enumerate() {
        write!(output, "| {} |", format_number(*operations)).unwrap();
        for series in results.series.values() {
            write!(output, " {} |", format_number(series.values[row])).unwrap();
        }
        writeln!(output).unwrap();
    }

    if results.series.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "_No implementation timings were present._").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Sources:").unwrap();
    for source in &results.sources {
        writeln!(output, "- `{}`", source.display()).unwrap();
    }

    output
}

/// Integers print bare, everything else with three decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NormalizedSeries;
    use crate::result::Implementation;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample() -> NormalizedResults {
        let mut series = BTreeMap::new();
        series.insert(
            Implementation::Stdlib,
            NormalizedSeries {
                implementation: Implementation::Stdlib,
                values: vec![10.0, 12.25],
                runs: 2,
            },
        );
        series.insert(
            Implementation::Phoenix,
            NormalizedSeries {
                implementation: Implementation::Phoenix,
                values: vec![40.0, 80.5],
                runs: 2,
            },
        );
        NormalizedResults {
            operations: vec![1000.0, 2000.0],
            series,
            sources: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
        }
    }

    #[test]
    fn test_summary_has_header_and_rows() {
        let summary = generate_summary(&sample());
        assert!(summary.starts_with("# Benchmark Summary"));
        assert!(summary.contains("Runs averaged: 2"));
        assert!(summary.contains("| Operations | Existing CRDT | Standard Library |"));
        assert!(summary.contains("| 1000 | 40 | 10 |"));
        assert!(summary.contains("| 2000 | 80.500 | 12.250 |"));
        assert!(summary.contains("- `b.json`"));
    }

    #[test]
    fn test_summary_without_series() {
        let mut results = sample();
        results.series.clear();
        let summary = generate_summary(&results);
        assert!(summary.contains("No implementation timings"));
        assert!(summary.contains("| 1000 |"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.1234), "0.123");
    }
}
