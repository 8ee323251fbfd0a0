//! Layered settings for the CLI.
//!
//! Sources, lowest priority first: built-in defaults, an optional
//! `crdt-bench.toml` (or the file passed with `--config`), then
//! `CRDT_BENCH_*` environment variables. Command-line flags are applied on
//! top by the caller.

use config::{Config, ConfigError, Environment, File};
use crdt_bench_chart::ChartStyle;
use crdt_bench_results::PresencePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "crdt-bench";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "CRDT_BENCH";

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chart caption.
    pub title: String,
    /// X axis description.
    pub x_label: String,
    /// Y axis description.
    pub y_label: String,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Base font size.
    pub font_size: u32,
    /// Where `plot` writes the chart.
    pub output: PathBuf,
    /// Handling of implementations present in only some runs.
    pub presence_policy: PresencePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        let style = ChartStyle::default();
        Self {
            title: style.title,
            x_label: style.x_label,
            y_label: style.y_label,
            width: style.width,
            height: style.height,
            font_size: style.font_size,
            output: PathBuf::from("plot.svg"),
            presence_policy: PresencePolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from `file` (or the default file, if present) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named file is missing or any source holds a
    /// value of the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings using `env` as the environment source.
    pub fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let builder = Config::builder();
        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Presentation settings for the chart.
    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            width: self.width,
            height: self.height,
            font_size: self.font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_chart_style() {
        let settings = Settings::default();
        assert_eq!(settings.chart_style(), ChartStyle::default());
        assert_eq!(settings.presence_policy, PresencePolicy::Unanimous);
        assert_eq!(settings.output, PathBuf::from("plot.svg"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "title = \"Insert throughput\"\nwidth = 640\npresence_policy = \"present_only\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.title, "Insert throughput");
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, 768);
        assert_eq!(settings.presence_policy, PresencePolicy::PresentOnly);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let vars: Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(vars))
    }

    #[test]
    fn test_env_overrides_presence_policy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "presence_policy = \"unanimous\"\nwidth = 640\n").unwrap();

        let settings = Settings::load_with_env(
            Some(&path),
            env(&[
                ("CRDT_BENCH_PRESENCE_POLICY", "present_only"),
                ("CRDT_BENCH_HEIGHT", "480"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.presence_policy, PresencePolicy::PresentOnly);
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, 480);
    }

    #[test]
    fn test_env_with_unknown_policy_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "width = 640\n").unwrap();

        let result = Settings::load_with_env(
            Some(&path),
            env(&[("CRDT_BENCH_PRESENCE_POLICY", "sometimes")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_bad_policy_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "presence_policy = \"sometimes\"\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }
}
