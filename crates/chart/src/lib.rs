//! Comparison chart for normalised CRDT benchmark results.
//!
//! A [`ComparisonChart`] accumulates one line per implementation over a shared
//! operations axis and renders them to SVG. Each line is labelled at its last
//! point rather than through a legend box.
//!
//! ```no_run
//! use crdt_bench_chart::{ChartStyle, ComparisonChart};
//!
//! let mut chart = ComparisonChart::new(ChartStyle::default(), vec![1.0, 2.0, 3.0]);
//! chart.add_series("StdLib", vec![0.5, 0.7, 0.9])?;
//! chart.save_svg("plot.svg")?;
//! # Ok::<(), crdt_bench_chart::ChartError>(())
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use crdt_bench_results::NormalizedResults;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while building or rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// There is no operations axis to plot against.
    #[error("Nothing to plot: the operations axis is empty")]
    NoData,

    /// A series does not line up with the operations axis.
    #[error("Series `{label}` has {found} points but the operations axis has {expected}")]
    LengthMismatch {
        /// Series label.
        label: String,
        /// Length of the operations axis.
        expected: usize,
        /// Length of the series.
        found: usize,
    },

    /// The drawing backend failed.
    #[error("Failed to render chart: {0}")]
    Render(String),

    /// The chart could not be written out.
    #[error("Failed to write chart to {}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// plotters' SVG backend divides text sizes by this factor when writing
/// `font-size`.
const SVG_TEXT_SCALE: f64 = 1.24;

/// Result type for chart operations.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Fixed presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Chart caption.
    pub title: String,
    /// X axis description.
    pub x_label: String,
    /// Y axis description.
    pub y_label: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Base font size in points.
    pub font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "Time taken to perform N operations".to_string(),
            x_label: "Operations (thousands)".to_string(),
            y_label: "Time (nanoseconds)".to_string(),
            width: 1024,
            height: 768,
            font_size: 12,
        }
    }
}

/// One labelled line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    /// Text drawn at the end of the line.
    pub label: String,
    /// Y value per operations entry.
    pub values: Vec<f64>,
}

/// Chart builder holding the operations axis and accumulated series.
#[derive(Debug, Clone)]
pub struct ComparisonChart {
    style: ChartStyle,
    operations: Vec<f64>,
    series: Vec<PlotSeries>,
}

impl ComparisonChart {
    /// Create an empty chart over `operations`.
    pub fn new(style: ChartStyle, operations: Vec<f64>) -> Self {
        Self {
            style,
            operations,
            series: Vec::new(),
        }
    }

    /// Build a chart with one line per implementation present in `results`.
    pub fn from_normalized(style: ChartStyle, results: &NormalizedResults) -> Result<Self> {
        let mut chart = Self::new(style, results.operations.clone());
        for series in results.series.values() {
            chart.add_series(series.implementation.label(), series.values.clone())?;
        }
        Ok(chart)
    }

    /// Add a labelled line. Empty series are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::LengthMismatch`] if `values` does not have one
    /// entry per operations point.
    pub fn add_series(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<&mut Self> {
        let label = label.into();
        if values.is_empty() {
            warn!(%label, "Skipping empty series");
            return Ok(self);
        }
        if values.len() != self.operations.len() {
            return Err(ChartError::LengthMismatch {
                label,
                expected: self.operations.len(),
                found: values.len(),
            });
        }
        self.series.push(PlotSeries { label, values });
        Ok(self)
    }

    /// Lines accumulated so far, in drawing order.
    pub fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    /// Presentation settings.
    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Render the chart as an SVG document.
    pub fn render_svg(&self) -> Result<String> {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, (self.style.width, self.style.height))
                .into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(render_error)?;
        }
        Ok(buffer)
    }

    /// Render the chart and write it to `path`.
    pub fn save_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let svg = self.render_svg()?;
        std::fs::write(path, svg).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), series = self.series.len(), "Wrote chart");
        Ok(())
    }

    fn x_range(&self) -> Result<(f64, f64)> {
        let min = self.operations.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.operations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return Err(ChartError::NoData);
        }
        if max > min {
            Ok((min, max))
        } else {
            Ok((min, min + 1.0))
        }
    }

    /// Upper Y bound: largest plotted value with 5% headroom.
    fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|series| series.values.iter().copied())
            .filter(|value| value.is_finite())
            .fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.05
        } else {
            1.0
        }
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let (x_min, x_max) = self.x_range()?;
        let font_size = f64::from(self.style.font_size) * SVG_TEXT_SCALE;

        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.style.title, ("sans-serif", font_size * 1.5).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..self.y_max())
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(&BLACK.mix(0.12))
            .light_line_style(&WHITE)
            .axis_style(&BLACK.mix(0.2))
            .x_desc(self.style.x_label.as_str())
            .y_desc(self.style.y_label.as_str())
            .label_style(("sans-serif", font_size).into_font())
            .axis_desc_style(("sans-serif", font_size).into_font())
            .draw()
            .map_err(render_error)?;

        let line_height = (f64::from(self.style.font_size) * 1.2).round() as i32;
        for (index, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(index).mix(1.0);
            let points: Vec<(f64, f64)> = self
                .operations
                .iter()
                .copied()
                .zip(series.values.iter().copied())
                .collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(render_error)?;

            let Some(&anchor) = points.last() else {
                continue;
            };
            let lines = wrap_label(&series.label);
            let top = -(line_height * lines.len() as i32) / 2;
            let text_style = TextStyle::from(("sans-serif", font_size).into_font()).color(&color);
            chart
                .draw_series(lines.into_iter().enumerate().map(|(row, line)| {
                    EmptyElement::at(anchor)
                        + Text::new(line, (6, top + row as i32 * line_height), text_style.clone())
                }))
                .map_err(render_error)?;
        }

        Ok(())
    }
}

/// Split a label into one centred word per line.
///
/// Each word is centred in a field four characters wider than the longest
/// word, so multi-word labels stack neatly at the end of a line.
pub fn wrap_label(label: &str) -> Vec<String> {
    let parts: Vec<&str> = label.split(' ').collect();
    let width = parts.iter().map(|part| part.chars().count()).max().unwrap_or(0) + 4;
    parts
        .into_iter()
        .map(|part| format!("{:^width$}", part, width = width))
        .collect()
}

fn render_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}
