//! Order aggregation and statistics.
//!
//! This module turns a filtered set of order records into the summary
//! tables shown on the dashboard. Every function here is pure: it borrows
//! the records and returns freshly built tables.

use crate::models::{
    CategorySales, DateColumn, DateRange, MonthlySummary, OrderRecord, PaymentTypeSummary,
    ReviewScoreDistribution, ScoreCount,
};
use chrono::Datelike;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Years covered by the monthly trend.
pub const TREND_YEARS: [i32; 3] = [2016, 2017, 2018];

/// Keep records whose `column` date lies inside `range` (inclusive).
///
/// Records without a value in `column` are dropped.
pub fn filter_by_date_range(
    records: &[OrderRecord],
    range: &DateRange,
    column: DateColumn,
) -> Vec<OrderRecord> {
    records
        .iter()
        .filter(|r| r.timestamp(column).is_some_and(|ts| range.contains(ts)))
        .cloned()
        .collect()
}

/// Monthly order count and revenue for 2016 through 2018, in (year, month) order.
pub fn monthly_summary(records: &[OrderRecord]) -> Vec<MonthlySummary> {
    let mut grouped: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();

    for record in records {
        let ts = record.order_purchase_timestamp;
        if !TREND_YEARS.contains(&ts.year()) {
            continue;
        }

        let entry = grouped.entry((ts.year(), ts.month())).or_default();
        if record.order_id.is_some() {
            entry.0 += 1;
        }
        entry.1 += record.payment_value.unwrap_or(0.0);
    }

    grouped
        .into_iter()
        .map(|((year, month), (order_count, revenue))| MonthlySummary {
            year,
            month,
            order_count,
            revenue,
        })
        .collect()
}

/// Monthly rows for a single year.
pub fn monthly_for_year(monthly: &[MonthlySummary], year: i32) -> Vec<&MonthlySummary> {
    monthly.iter().filter(|m| m.year == year).collect()
}

/// Item rows sold per product category, best sellers first.
///
/// Counts every product occurrence, so a multi-item order contributes once
/// per item. Ties are ordered by category name.
pub fn product_ranking(records: &[OrderRecord]) -> Vec<CategorySales> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        if let (Some(category), Some(_)) = (
            record.product_category_name_english.as_deref(),
            record.product_id.as_ref(),
        ) {
            *counts.entry(category).or_default() += 1;
        }
    }

    let mut ranking: Vec<CategorySales> = counts
        .into_iter()
        .map(|(category, order_count)| CategorySales {
            category: category.to_string(),
            order_count,
        })
        .collect();

    // Stable sort keeps the name order from the map for ties.
    ranking.sort_by_key(|c| Reverse(c.order_count));
    ranking
}

/// The `n` best selling categories.
pub fn top_categories(ranking: &[CategorySales], n: usize) -> Vec<CategorySales> {
    ranking.iter().take(n).cloned().collect()
}

/// The `n` worst selling categories, lowest count first.
pub fn bottom_categories(ranking: &[CategorySales], n: usize) -> Vec<CategorySales> {
    let mut sorted = ranking.to_vec();
    sorted.sort_by(|a, b| {
        a.order_count
            .cmp(&b.order_count)
            .then_with(|| a.category.cmp(&b.category))
    });
    sorted.truncate(n);
    sorted
}

/// Review score frequencies, most frequent first, with the mode.
///
/// Ties in frequency are ordered by ascending score, so the mode is the
/// lowest score among the most frequent ones.
pub fn review_score_distribution(records: &[OrderRecord]) -> ReviewScoreDistribution {
    let mut freq: BTreeMap<u8, usize> = BTreeMap::new();

    for score in records.iter().filter_map(|r| r.review_score) {
        *freq.entry(score).or_default() += 1;
    }

    let mut counts: Vec<ScoreCount> = freq
        .into_iter()
        .map(|(score, frequency)| ScoreCount { score, frequency })
        .collect();
    counts.sort_by_key(|c| Reverse(c.frequency));

    let mode = counts.first().map(|c| c.score);

    ReviewScoreDistribution { counts, mode }
}

/// Orders per payment method, most used first. Ties are ordered by name.
pub fn payment_type_summary(records: &[OrderRecord]) -> Vec<PaymentTypeSummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        if let (Some(payment_type), Some(_)) =
            (record.payment_type.as_deref(), record.order_id.as_ref())
        {
            *counts.entry(payment_type).or_default() += 1;
        }
    }

    let mut summary: Vec<PaymentTypeSummary> = counts
        .into_iter()
        .map(|(payment_type, order_count)| PaymentTypeSummary {
            payment_type: payment_type.to_string(),
            order_count,
        })
        .collect();

    summary.sort_by_key(|p| Reverse(p.order_count));
    summary
}
