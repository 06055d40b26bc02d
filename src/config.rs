//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ecomdash.toml` files.

use crate::models::DateColumn;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".ecomdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Date filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the order dataset.
    #[serde(default = "default_data")]
    pub data: String,

    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data: default_data(),
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_data() -> String {
    "dashboard/all_data.csv".to_string()
}

fn default_output() -> String {
    "ecomdash_report.md".to_string()
}

/// Date range settings. Missing bounds default to the dataset's span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Timestamp column the range applies to.
    #[serde(default)]
    pub date_column: DateColumn,

    /// First day of the range (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Last day of the range (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of best and worst selling categories to show.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Width of text bar charts in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Draw bar charts next to the tables.
    #[serde(default = "default_true")]
    pub include_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            bar_width: default_bar_width(),
            include_charts: true,
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_bar_width() -> usize {
    40
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.ecomdash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.general.data = data.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(column) = args.date_column {
            self.filter.date_column = column;
        }
        if args.start.is_some() {
            self.filter.start = args.start;
        }
        if args.end.is_some() {
            self.filter.end = args.end;
        }

        if let Some(top) = args.top {
            self.report.top_n = top;
        }
        if let Some(width) = args.bar_width {
            self.report.bar_width = width;
        }
        if args.no_charts {
            self.report.include_charts = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check settings that the file can set but the CLI would reject.
    ///
    /// Call after [`Config::merge_with_args`].
    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            bail!("report.top_n must be at least 1");
        }
        if self.report.bar_width == 0 {
            bail!("report.bar_width must be at least 1");
        }
        if self.general.data.trim().is_empty() {
            bail!("general.data must name a dataset file");
        }
        Ok(())
    }

    /// Log level from the CLI flags and the file's `verbose` setting.
    ///
    /// `--quiet` wins over `verbose = true` in the file.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.data, "dashboard/all_data.csv");
        assert_eq!(config.filter.date_column, DateColumn::Purchase);
        assert_eq!(config.report.top_n, 10);
        assert!(config.report.include_charts);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
data = "data/orders.csv"
verbose = true

[filter]
date_column = "approved"
start = "2017-01-01"
end = "2017-12-31"

[report]
top_n = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.data, "data/orders.csv");
        assert_eq!(config.general.output, "ecomdash_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.filter.date_column, DateColumn::Approved);
        assert_eq!(config.filter.start, NaiveDate::from_ymd_opt(2017, 1, 1));
        assert_eq!(config.filter.end, NaiveDate::from_ymd_opt(2017, 12, 31));
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.bar_width, 40);
    }

    #[test]
    fn test_merge_with_args_prefers_cli() {
        let mut config = Config::default();
        config.filter.start = NaiveDate::from_ymd_opt(2016, 1, 1);
        config.report.top_n = 3;

        let mut args = make_args();
        args.data = Some(PathBuf::from("other.csv"));
        args.end = NaiveDate::from_ymd_opt(2018, 6, 30);
        args.no_charts = true;

        config.merge_with_args(&args);
        assert_eq!(config.general.data, "other.csv");
        // Not given on the command line, so the file value stays.
        assert_eq!(config.filter.start, NaiveDate::from_ymd_opt(2016, 1, 1));
        assert_eq!(config.filter.end, NaiveDate::from_ymd_opt(2018, 6, 30));
        assert_eq!(config.report.top_n, 3);
        assert!(!config.report.include_charts);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report]\nbar_width = 20\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.report.bar_width, 20);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_report_sizes() {
        assert!(Config::default().validate().is_ok());

        let config: Config = toml::from_str("[report]\ntop_n = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_n"));

        let config: Config = toml::from_str("[report]\nbar_width = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_top_overrides_invalid_file_value() {
        let mut config: Config = toml::from_str("[report]\ntop_n = 0\n").unwrap();
        let mut args = make_args();
        args.top = Some(5);

        config.merge_with_args(&args);
        assert!(config.validate().is_ok());
        assert_eq!(config.report.top_n, 5);
    }

    #[test]
    fn test_log_level_uses_file_verbose() {
        let mut config = Config::default();
        assert_eq!(config.log_level(false), tracing::Level::INFO);

        let file: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        assert_eq!(file.log_level(false), tracing::Level::DEBUG);
        assert_eq!(file.log_level(true), tracing::Level::ERROR);

        let mut args = make_args();
        args.verbose = true;
        config.merge_with_args(&args);
        assert_eq!(config.log_level(false), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[filter]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.report.top_n, 10);
    }
}
