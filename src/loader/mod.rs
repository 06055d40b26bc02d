//! Dataset loading.
//!
//! This module reads the order CSV once into an immutable [`Dataset`],
//! coercing timestamp columns. Columns other than the ones in
//! [`OrderRecord`] are ignored.

use crate::models::{DateColumn, DateRange, OrderRecord};
use chrono::{NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Timestamp layouts accepted in date columns.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors raised while loading the dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: invalid {column} value {value:?}")]
    Timestamp {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// A CSV row before timestamp coercion.
#[derive(Debug, Deserialize)]
struct RawOrderRow {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    order_purchase_timestamp: Option<String>,
    #[serde(default)]
    order_approved_at: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    product_category_name_english: Option<String>,
    #[serde(default)]
    payment_type: Option<String>,
    #[serde(default)]
    payment_value: Option<f64>,
    #[serde(default)]
    review_score: Option<f64>,
}

impl RawOrderRow {
    fn into_record(self, line: u64) -> Result<OrderRecord, LoadError> {
        let purchase = self.order_purchase_timestamp.as_deref().unwrap_or("");
        let order_purchase_timestamp =
            parse_timestamp(purchase).ok_or_else(|| LoadError::Timestamp {
                line,
                column: "order_purchase_timestamp",
                value: purchase.to_string(),
            })?;

        let order_approved_at = match self.order_approved_at.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_timestamp(value).ok_or_else(|| {
                LoadError::Timestamp {
                    line,
                    column: "order_approved_at",
                    value: value.to_string(),
                }
            })?),
        };

        Ok(OrderRecord {
            order_id: non_empty(self.order_id),
            order_purchase_timestamp,
            order_approved_at,
            product_id: non_empty(self.product_id),
            product_category_name_english: non_empty(self.product_category_name_english),
            payment_type: non_empty(self.payment_type),
            payment_value: self.payment_value,
            review_score: review_score(self.review_score, line),
        })
    }
}

/// Keep whole scores in 1..=5; anything else present is logged and dropped.
fn review_score(value: Option<f64>, line: u64) -> Option<u8> {
    let score = value?;
    if score.fract() == 0.0 && (1.0..=5.0).contains(&score) {
        Some(score as u8)
    } else {
        warn!("line {}: ignoring review_score {} outside 1-5", line, score);
        None
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a timestamp cell; bare dates are taken as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// The full, load-once record set.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<OrderRecord>,
}

impl Dataset {
    /// Wrap already-loaded records.
    pub fn new(source: impl Into<PathBuf>, mut records: Vec<OrderRecord>) -> Self {
        sort_by_approval(&mut records);
        Self {
            source: source.into(),
            records,
        }
    }

    /// Path the dataset was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All records, ordered by approval time.
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest calendar date of `column`, if any row has one.
    pub fn date_bounds(&self, column: DateColumn) -> Option<DateRange> {
        let mut dates = self
            .records
            .iter()
            .filter_map(|r| r.timestamp(column))
            .map(|ts| ts.date());

        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

        Some(DateRange { start, end })
    }
}

/// Stable sort by approval time with missing approvals last.
fn sort_by_approval(records: &mut [OrderRecord]) {
    records.sort_by(|a, b| match (a.order_approved_at, b.order_approved_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Load order records from any CSV reader.
pub fn load_records<R: Read>(reader: R) -> Result<Vec<OrderRecord>, LoadError> {
    load_records_with_progress(reader, None)
}

fn load_records_with_progress<R: Read>(
    reader: R,
    progress: Option<&ProgressBar>,
) -> Result<Vec<OrderRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize::<RawOrderRow>().enumerate() {
        // Header is line 1.
        let line = index as u64 + 2;
        let raw = result.map_err(|source| LoadError::Csv { line, source })?;
        records.push(raw.into_record(line)?);

        if let Some(pb) = progress {
            if records.len() % 10_000 == 0 {
                pb.set_message(format!("{} rows", records.len()));
            }
        }
    }

    Ok(records)
}

/// Load the dataset from a CSV file.
pub fn load_dataset(path: &Path, show_progress: bool) -> Result<Dataset, LoadError> {
    info!("Loading dataset: {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let progress = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Reading orders...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = load_records_with_progress(file, progress.as_ref());

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let records = result?;
    debug!("Parsed {} rows from {}", records.len(), path.display());

    Ok(Dataset::new(path, records))
}
