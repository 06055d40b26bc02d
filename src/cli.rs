//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::DateColumn;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// ecomdash - E-commerce order analytics in the terminal
///
/// Loads an order dataset, restricts it to a date range, and reports
/// the monthly order trend, best and worst selling categories, review
/// scores, and payment methods as Markdown or JSON.
///
/// Examples:
///   ecomdash --data dashboard/all_data.csv
///   ecomdash --data all_data.csv --start 2017-01-01 --end 2017-12-31
///   ecomdash --data all_data.csv --date-column approved --format json -o dash.json
///   ecomdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Order dataset (CSV) to load
    ///
    /// Defaults to the config file value, then dashboard/all_data.csv.
    #[arg(short, long, value_name = "FILE", env = "ECOMDASH_DATA")]
    pub data: Option<PathBuf>,

    /// First day of the date range (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the earliest date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the latest date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Timestamp column the date range applies to
    #[arg(long, value_name = "COLUMN")]
    pub date_column: Option<DateColumn>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of best and worst selling categories to show
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Width of the text bar charts
    #[arg(long, value_name = "CHARS")]
    pub bar_width: Option<usize>,

    /// Leave bar charts out of the Markdown report
    #[arg(long)]
    pub no_charts: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ecomdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .ecomdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!("Start date {} is after end date {}", start, end));
            }
        }

        if self.top == Some(0) {
            return Err("Top count must be at least 1".to_string());
        }

        if self.bar_width == Some(0) {
            return Err("Bar width must be at least 1".to_string());
        }

        if let Some(ref data) = self.data {
            if data.is_dir() {
                return Err(format!("Data path is a directory: {}", data.display()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            data: None,
            start: None,
            end: None,
            date_column: None,
            output: None,
            format: OutputFormat::Markdown,
            top: None,
            bar_width: None,
            no_charts: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_date_range_flags() {
        let args = Args::try_parse_from([
            "ecomdash",
            "--data",
            "orders.csv",
            "--start",
            "2017-01-01",
            "--end",
            "2017-06-30",
            "--date-column",
            "approved",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("orders.csv")));
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2017, 1, 1));
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2017, 6, 30));
        assert_eq!(args.date_column, Some(DateColumn::Approved));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_malformed_date() {
        assert!(Args::try_parse_from(["ecomdash", "--start", "01/02/2017"]).is_err());
    }

    #[test]
    fn test_validation_inverted_range() {
        let mut args = make_args();
        args.start = NaiveDate::from_ymd_opt(2018, 1, 1);
        args.end = NaiveDate::from_ymd_opt(2017, 1, 1);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_counts() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.bar_width = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }
}
