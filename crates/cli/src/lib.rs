//! CLI for plotting CRDT benchmark results.
//!
//! This crate provides the `crdt-bench` command: `plot` renders the
//! comparison chart, `summary` writes a markdown or JSON report, and
//! `status` shows the effective configuration.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use crdt_bench_chart::ComparisonChart;
use crdt_bench_results::{io, load_and_normalise, markdown, NormalizedResults, PresencePolicy};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// CRDT benchmark plotting CLI.
#[derive(Parser, Debug)]
#[command(name = "crdt-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Settings file (defaults to ./crdt-bench.toml when present).
    #[arg(short, long, global = true, env = "CRDT_BENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Report format for `summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Markdown table.
    Markdown,
    /// Pretty-printed JSON.
    Json,
}

/// Where to read results from.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Result file, or directory of `*.json` result files to average.
    #[arg(value_name = "PATH", required_unless_present = "directory")]
    pub path: Option<PathBuf>,

    /// Directory of result files (alternative to PATH).
    #[arg(short, long, value_name = "DIR", conflicts_with = "path")]
    pub directory: Option<PathBuf>,

    /// How to treat implementations missing from some runs: unanimous or present_only.
    #[arg(long, value_name = "POLICY")]
    pub presence_policy: Option<PresencePolicy>,
}

impl InputArgs {
    /// The path given either positionally or with `--directory`.
    pub fn location(&self) -> anyhow::Result<&Path> {
        self.path
            .as_deref()
            .or(self.directory.as_deref())
            .context("a result file or directory is required")
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Average result files and render the comparison chart as SVG.
    Plot {
        /// Input selection.
        #[command(flatten)]
        input: InputArgs,

        /// Chart output path (overrides the configured one).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart title (overrides the configured one).
        #[arg(long)]
        title: Option<String>,
    },

    /// Average result files and print a report.
    Summary {
        /// Input selection.
        #[command(flatten)]
        input: InputArgs,

        /// Report format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version and effective configuration.
    Status {
        /// Show detailed status information.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);
    execute(cli)
}

/// Execute an already parsed command line.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Plot {
            input,
            output,
            title,
        } => {
            if let Some(title) = title {
                settings.title = title;
            }
            if let Some(output) = output {
                settings.output = output;
            }

            let results = load(&input, &settings)?;
            let chart = ComparisonChart::from_normalized(settings.chart_style(), &results)
                .context("Failed to build chart")?;
            chart
                .save_svg(&settings.output)
                .context("Failed to render chart")?;

            println!(
                "{} {} ({} run(s), {} series)",
                "Chart written to".green(),
                settings.output.display(),
                results.sources.len(),
                chart.series().len()
            );
            Ok(())
        }
        Commands::Summary {
            input,
            format,
            output,
        } => {
            let results = load(&input, &settings)?;

            match (format, output) {
                (ReportFormat::Markdown, Some(path)) => io::write_summary(&results, &path)?,
                (ReportFormat::Json, Some(path)) => io::write_normalized_json(&results, &path)?,
                (ReportFormat::Markdown, None) => print!("{}", markdown::generate_summary(&results)),
                (ReportFormat::Json, None) => println!("{}", io::to_json(&results)?),
            }
            Ok(())
        }
        Commands::Status { detailed } => {
            println!("CRDT benchmark plots");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Presence policy: {:?}", settings.presence_policy);
            println!("Chart output: {}", settings.output.display());

            if detailed {
                println!("\nEffective settings:");
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }

            Ok(())
        }
    }
}

fn load(input: &InputArgs, settings: &Settings) -> anyhow::Result<NormalizedResults> {
    let location = input.location()?;
    let policy = input.presence_policy.unwrap_or(settings.presence_policy);
    info!(path = %location.display(), ?policy, "Loading benchmark results");

    load_and_normalise(location, policy)
        .with_context(|| format!("Failed to load results from {}", location.display()))
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded; keep it.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    fn write_runs(dir: &TempDir) {
        fs::write(
            dir.path().join("run-1.json"),
            r#"{"results": [{"operations": 100, "stdlib": {"time": 5}}, {"operations": 200, "stdlib": {"time": 9}}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("run-2.json"),
            r#"{"results": [{"operations": 100, "stdlib": {"time": 15}}, {"operations": 200, "stdlib": {"time": 11}}]}"#,
        )
        .unwrap();
    }

    fn config_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("settings.toml");
        fs::write(&path, "font_size = 12\n").unwrap();
        path
    }

    #[test]
    fn test_missing_path_is_usage_error() {
        let err = Cli::try_parse_from(["crdt-bench", "plot"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_directory_flag_is_accepted() {
        let cli = Cli::try_parse_from(["crdt-bench", "plot", "-d", "results"]).unwrap();
        match cli.command {
            Commands::Plot { input, .. } => {
                assert_eq!(input.location().unwrap(), Path::new("results"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_presence_policy_flag() {
        let cli = Cli::try_parse_from([
            "crdt-bench",
            "summary",
            "results",
            "--presence-policy",
            "present_only",
        ])
        .unwrap();
        match cli.command {
            Commands::Summary { input, .. } => {
                assert_eq!(input.presence_policy, Some(PresencePolicy::PresentOnly));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_plot_writes_svg() {
        let dir = TempDir::new().unwrap();
        write_runs(&dir);
        let config = config_file(&dir);
        let output = dir.path().join("chart.svg");

        let cli = Cli::try_parse_from([
            OsString::from("crdt-bench"),
            OsString::from("plot"),
            OsString::from(dir.path()),
            OsString::from("--config"),
            OsString::from(&config),
            OsString::from("--output"),
            OsString::from(&output),
        ])
        .unwrap();
        execute(cli).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("StdLib"));
    }

    #[test]
    fn test_summary_json_averages_runs() {
        let dir = TempDir::new().unwrap();
        write_runs(&dir);
        let config = config_file(&dir);
        let output = dir.path().join("summary.out");

        let cli = Cli::try_parse_from([
            OsString::from("crdt-bench"),
            OsString::from("summary"),
            OsString::from(dir.path()),
            OsString::from("--config"),
            OsString::from(&config),
            OsString::from("--format"),
            OsString::from("json"),
            OsString::from("--output"),
            OsString::from(&output),
        ])
        .unwrap();
        execute(cli).unwrap();

        let results: NormalizedResults =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(results.operations, vec![100.0, 200.0]);
        let stdlib = results
            .get(crdt_bench_results::Implementation::Stdlib)
            .unwrap();
        assert_eq!(stdlib.values, vec![10.0, 10.0]);
    }

    #[test]
    fn test_plot_fails_on_missing_directory() {
        let dir = TempDir::new().unwrap();
        let config = config_file(&dir);
        let missing = dir.path().join("nowhere");

        let cli = Cli::try_parse_from([
            OsString::from("crdt-bench"),
            OsString::from("plot"),
            OsString::from(&missing),
            OsString::from("--config"),
            OsString::from(&config),
        ])
        .unwrap();
        let err = execute(cli).unwrap_err();
        assert!(err.to_string().contains("Failed to load results"));
    }
}
