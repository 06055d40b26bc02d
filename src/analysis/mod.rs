//! Analysis modules.
//!
//! Pure aggregations over order records plus assembly of the full
//! dashboard for a selected date range.

pub mod aggregator;

pub use aggregator::*;

use crate::loader::Dataset;
use crate::models::{Dashboard, DashboardMetadata, DateColumn, DateRange};
use chrono::Utc;
use tracing::debug;

/// Filter the dataset to `range` and compute every dashboard summary.
///
/// With no range the whole dataset is used.
pub fn build_dashboard(
    dataset: &Dataset,
    range: Option<DateRange>,
    column: DateColumn,
    top_n: usize,
) -> Dashboard {
    let selected = match range {
        Some(ref r) => filter_by_date_range(dataset.records(), r, column),
        None => dataset.records().to_vec(),
    };
    debug!(
        "Selected {} of {} records for {:?}",
        selected.len(),
        dataset.len(),
        range
    );

    let ranking = product_ranking(&selected);

    Dashboard {
        metadata: DashboardMetadata {
            source: dataset.source().to_path_buf(),
            generated_at: Utc::now(),
            date_column: column,
            date_range: range,
            total_records: dataset.len(),
            selected_records: selected.len(),
        },
        monthly_orders: monthly_summary(&selected),
        best_selling: top_categories(&ranking, top_n),
        worst_selling: bottom_categories(&ranking, top_n),
        product_ranking: ranking,
        review_scores: review_score_distribution(&selected),
        payment_types: payment_type_summary(&selected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_records;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let records =
            load_records(include_str!("../../fixtures/orders_sample.csv").as_bytes()).unwrap();
        Dataset::new("orders_sample.csv", records)
    }

    #[test]
    fn test_build_dashboard_full_range() {
        let dataset = dataset();
        let bounds = dataset.date_bounds(DateColumn::Purchase);
        let dashboard = build_dashboard(&dataset, bounds, DateColumn::Purchase, 2);

        assert_eq!(dashboard.metadata.total_records, 12);
        assert_eq!(dashboard.metadata.selected_records, 12);
        assert_eq!(dashboard.best_selling.len(), 2);
        assert_eq!(dashboard.worst_selling.len(), 2);
        assert_eq!(dashboard.product_ranking.len(), 5);
        assert_eq!(dashboard.review_scores.mode, Some(5));
    }

    #[test]
    fn test_build_dashboard_empty_range() {
        let dataset = dataset();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2015, 12, 31).unwrap(),
        )
        .ok();
        let dashboard = build_dashboard(&dataset, range, DateColumn::Purchase, 10);

        assert!(dashboard.is_empty());
        assert!(dashboard.monthly_orders.is_empty());
        assert!(dashboard.product_ranking.is_empty());
        assert!(dashboard.payment_types.is_empty());
        assert_eq!(dashboard.review_scores.mode, None);
        assert_eq!(dashboard.total_revenue(), 0.0);
    }

    #[test]
    fn test_build_dashboard_start_after_dataset_is_empty() {
        let dataset = dataset();
        let bounds = dataset.date_bounds(DateColumn::Purchase);
        let range =
            DateRange::resolve(NaiveDate::from_ymd_opt(2020, 1, 1), None, bounds).unwrap();

        let dashboard = build_dashboard(&dataset, range, DateColumn::Purchase, 10);
        assert!(range.is_some());
        assert!(dashboard.is_empty());
        assert!(dashboard.best_selling.is_empty());
        assert_eq!(dashboard.review_scores.mode, None);
    }
}
