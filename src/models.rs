//! Data models for the dashboard.
//!
//! This module contains the order record loaded from the dataset and the
//! derived summary tables produced by the aggregations.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A denormalized order row joining order, item, product, payment and review data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order key.
    pub order_id: Option<String>,
    /// When the order was placed.
    pub order_purchase_timestamp: NaiveDateTime,
    /// When the payment was approved.
    pub order_approved_at: Option<NaiveDateTime>,
    /// Purchased product.
    pub product_id: Option<String>,
    /// Product category label (English).
    pub product_category_name_english: Option<String>,
    /// Payment method used.
    pub payment_type: Option<String>,
    /// Amount paid.
    pub payment_value: Option<f64>,
    /// Customer rating, 1 through 5.
    pub review_score: Option<u8>,
}

impl OrderRecord {
    /// Returns the timestamp used for date filtering.
    pub fn timestamp(&self, column: DateColumn) -> Option<NaiveDateTime> {
        match column {
            DateColumn::Purchase => Some(self.order_purchase_timestamp),
            DateColumn::Approved => self.order_approved_at,
        }
    }
}

/// Timestamp column a date range applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DateColumn {
    /// `order_purchase_timestamp`
    #[default]
    Purchase,
    /// `order_approved_at`
    Approved,
}

impl fmt::Display for DateColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateColumn::Purchase => write!(f, "order_purchase_timestamp"),
            DateColumn::Approved => write!(f, "order_approved_at"),
        }
    }
}

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Start date {} is after end date {}", start, end);
        }
        Ok(Self { start, end })
    }

    /// Fills missing bounds from the dataset bounds.
    ///
    /// Returns `Ok(None)` when a bound is missing and the dataset has no dates
    /// to default it from. Only a range whose bounds were both given can be
    /// rejected as inverted; a given bound outside the dataset collapses the
    /// defaulted one onto it, selecting nothing.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        bounds: Option<DateRange>,
    ) -> Result<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (Some(start), None) => Ok(bounds.map(|b| Self {
                start,
                end: b.end.max(start),
            })),
            (None, Some(end)) => Ok(bounds.map(|b| Self {
                start: b.start.min(end),
                end,
            })),
            (None, None) => Ok(bounds),
        }
    }

    /// Whether the calendar date of `timestamp` falls inside the range.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Order volume and revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub order_count: usize,
    pub revenue: f64,
}

/// Number of item rows sold in one product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,
    pub order_count: usize,
}

/// Frequency of one review score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCount {
    pub score: u8,
    pub frequency: usize,
}

/// Review scores ordered by frequency, with the most frequent score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScoreDistribution {
    /// Frequencies, most frequent first.
    pub counts: Vec<ScoreCount>,
    /// Most frequent score; `None` when no scores are present.
    pub mode: Option<u8>,
}

impl ReviewScoreDistribution {
    /// Total number of scored rows.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.frequency).sum()
    }

    /// Frequency of a given score, zero if absent.
    pub fn frequency_of(&self, score: u8) -> usize {
        self.counts
            .iter()
            .find(|c| c.score == score)
            .map_or(0, |c| c.frequency)
    }
}

/// Number of orders paid with one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTypeSummary {
    pub payment_type: String,
    pub order_count: usize,
}

/// Metadata about a generated dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetadata {
    /// Path of the loaded dataset.
    pub source: PathBuf,
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Column the date range was applied to.
    pub date_column: DateColumn,
    /// Selected range; `None` when the dataset had no dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Records in the full dataset.
    pub total_records: usize,
    /// Records inside the selected range.
    pub selected_records: usize,
}

/// The four summaries for a selected date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    pub monthly_orders: Vec<MonthlySummary>,
    pub product_ranking: Vec<CategorySales>,
    pub best_selling: Vec<CategorySales>,
    pub worst_selling: Vec<CategorySales>,
    pub review_scores: ReviewScoreDistribution,
    pub payment_types: Vec<PaymentTypeSummary>,
}

impl Dashboard {
    /// Total revenue across all monthly rows.
    pub fn total_revenue(&self) -> f64 {
        self.monthly_orders.iter().map(|m| m.revenue).sum()
    }

    /// Whether the selected range contained any records.
    pub fn is_empty(&self) -> bool {
        self.metadata.selected_records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(date(2018, 1, 2), date(2018, 1, 1)).is_err());
        assert!(DateRange::new(date(2018, 1, 1), date(2018, 1, 1)).is_ok());
    }

    #[test]
    fn test_date_range_contains_whole_end_day() {
        let range = DateRange::new(date(2017, 1, 1), date(2017, 1, 31)).unwrap();
        let late = date(2017, 1, 31).and_hms_opt(23, 59, 59).unwrap();
        let next = date(2017, 2, 1).and_hms_opt(0, 0, 0).unwrap();
        let first = date(2017, 1, 1).and_hms_opt(0, 0, 0).unwrap();

        assert!(range.contains(late));
        assert!(range.contains(first));
        assert!(!range.contains(next));
    }

    #[test]
    fn test_date_range_resolve_defaults_from_bounds() {
        let bounds = DateRange::new(date(2016, 9, 4), date(2018, 10, 17)).unwrap();

        let resolved = DateRange::resolve(Some(date(2017, 1, 1)), None, Some(bounds))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.start, date(2017, 1, 1));
        assert_eq!(resolved.end, date(2018, 10, 17));

        assert_eq!(DateRange::resolve(None, None, None).unwrap(), None);
        assert_eq!(DateRange::resolve(None, None, Some(bounds)).unwrap(), Some(bounds));
        assert!(DateRange::resolve(Some(date(2018, 1, 2)), Some(date(2018, 1, 1)), Some(bounds))
            .is_err());
    }

    #[test]
    fn test_date_range_resolve_start_after_dataset_selects_nothing() {
        let bounds = DateRange::new(date(2016, 10, 4), date(2019, 1, 3)).unwrap();

        let resolved = DateRange::resolve(Some(date(2020, 1, 1)), None, Some(bounds))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.start, date(2020, 1, 1));
        assert_eq!(resolved.end, date(2020, 1, 1));
        assert!(!resolved.contains(date(2019, 1, 3).and_hms_opt(8, 0, 0).unwrap()));
    }

    #[test]
    fn test_date_range_resolve_end_before_dataset_selects_nothing() {
        let bounds = DateRange::new(date(2016, 10, 4), date(2019, 1, 3)).unwrap();

        let resolved = DateRange::resolve(None, Some(date(2015, 6, 30)), Some(bounds))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.start, date(2015, 6, 30));
        assert_eq!(resolved.end, date(2015, 6, 30));
        assert!(!resolved.contains(date(2016, 10, 4).and_hms_opt(9, 0, 0).unwrap()));
    }

    #[test]
    fn test_review_distribution_helpers() {
        let dist = ReviewScoreDistribution {
            counts: vec![
                ScoreCount { score: 5, frequency: 2 },
                ScoreCount { score: 3, frequency: 1 },
            ],
            mode: Some(5),
        };
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.frequency_of(5), 2);
        assert_eq!(dist.frequency_of(1), 0);
    }

    #[test]
    fn test_date_column_display() {
        assert_eq!(DateColumn::Purchase.to_string(), "order_purchase_timestamp");
        assert_eq!(DateColumn::Approved.to_string(), "order_approved_at");
    }
}
