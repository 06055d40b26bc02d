//! Markdown and JSON dashboard generation.
//!
//! This module renders a [`Dashboard`] as a Markdown document with
//! tables and text bar charts, or as pretty-printed JSON.

use crate::analysis::{monthly_for_year, TREND_YEARS};
use crate::models::{
    CategorySales, Dashboard, DashboardMetadata, MonthlySummary, PaymentTypeSummary,
    ReviewScoreDistribution,
};
use anyhow::Result;
use num_format::{Locale, ToFormattedString};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const NO_DATA: &str = "_No data for the selected date range._\n\n";

/// Rendering options for the Markdown report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Width of the longest bar.
    pub bar_width: usize,
    /// Draw bar charts next to the tables.
    pub include_charts: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bar_width: 40,
            include_charts: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for RenderOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            bar_width: config.bar_width,
            include_charts: config.include_charts,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# E-Commerce Public Dashboard\n\n");

    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_table_of_contents());
    output.push_str(&generate_monthly_section(&dashboard.monthly_orders, options));
    output.push_str(&generate_products_section(
        &dashboard.best_selling,
        &dashboard.worst_selling,
        options,
    ));
    output.push_str(&generate_reviews_section(&dashboard.review_scores, options));
    output.push_str(&generate_payments_section(&dashboard.payment_types, options));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.source.display()));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    match metadata.date_range {
        Some(range) => section.push_str(&format!(
            "- **Date Range:** {} (by `{}`)\n",
            range, metadata.date_column
        )),
        None => section.push_str("- **Date Range:** entire dataset\n"),
    }
    section.push_str(&format!(
        "- **Records Selected:** {} of {}\n",
        format_count(metadata.selected_records),
        format_count(metadata.total_records)
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Monthly Purchase Orders](#monthly-purchase-orders)\n");
    toc.push_str("- [Best and Worst Selling Products](#best-and-worst-selling-products)\n");
    toc.push_str("- [Customer Review Scores](#customer-review-scores)\n");
    toc.push_str("- [Orders by Payment Type](#orders-by-payment-type)\n");
    toc.push('\n');

    toc
}

/// Generate the monthly trend section: one table plus a chart per year.
fn generate_monthly_section(monthly: &[MonthlySummary], options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Monthly Purchase Orders\n\n");
    section.push_str("*Purchase order count and revenue per month, 2016-2018.*\n\n");

    if monthly.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    section.push_str("| Year | Month | Orders | Revenue |\n");
    section.push_str("|:---:|:---|---:|---:|\n");
    for row in monthly {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.year,
            month_name(row.month),
            format_count(row.order_count),
            format_money(row.revenue)
        ));
    }
    section.push('\n');

    if options.include_charts {
        let max = monthly.iter().map(|m| m.order_count).max().unwrap_or(0);

        for year in TREND_YEARS {
            let rows = monthly_for_year(monthly, year);
            if rows.is_empty() {
                continue;
            }

            section.push_str(&format!("### Order Count {}\n\n```\n", year));
            for row in rows {
                section.push_str(&format!(
                    "{} {} {}\n",
                    month_name(row.month),
                    render_bar(row.order_count, max, options.bar_width),
                    row.order_count
                ));
            }
            section.push_str("```\n\n");
        }
    }

    section
}

/// Generate the best/worst sellers section.
fn generate_products_section(
    best: &[CategorySales],
    worst: &[CategorySales],
    options: &RenderOptions,
) -> String {
    let mut section = String::new();

    section.push_str("## Best and Worst Selling Products\n\n");

    if best.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    section.push_str(&format!("### Top {} Best Selling Products\n\n", best.len()));
    section.push_str(&category_table(best, options));

    section.push_str(&format!("### Bottom {} Worst Selling Products\n\n", worst.len()));
    section.push_str(&category_table(worst, options));

    section
}

fn category_table(rows: &[CategorySales], options: &RenderOptions) -> String {
    let max = rows.iter().map(|r| r.order_count).max().unwrap_or(0);
    let mut table = String::new();

    if options.include_charts {
        table.push_str("| Product Category | Total Order | |\n");
        table.push_str("|:---|---:|:---|\n");
    } else {
        table.push_str("| Product Category | Total Order |\n");
        table.push_str("|:---|---:|\n");
    }

    for row in rows {
        if options.include_charts {
            table.push_str(&format!(
                "| {} | {} | `{}` |\n",
                row.category,
                format_count(row.order_count),
                render_bar(row.order_count, max, options.bar_width)
            ));
        } else {
            table.push_str(&format!(
                "| {} | {} |\n",
                row.category,
                format_count(row.order_count)
            ));
        }
    }
    table.push('\n');

    table
}

/// Generate the review score section.
fn generate_reviews_section(dist: &ReviewScoreDistribution, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Customer Review Scores\n\n");

    let Some(mode) = dist.mode else {
        section.push_str(NO_DATA);
        section.push_str("**Most Frequent Score:** no data\n\n");
        return section;
    };

    section.push_str(&format!(
        "**Most Frequent Score:** {} ({} of {} reviews)\n\n",
        stars(mode),
        format_count(dist.frequency_of(mode)),
        format_count(dist.total())
    ));

    section.push_str("| Rating | Frequency |\n");
    section.push_str("|:---:|---:|\n");
    for count in &dist.counts {
        section.push_str(&format!(
            "| {} | {} |\n",
            count.score,
            format_count(count.frequency)
        ));
    }
    section.push('\n');

    if options.include_charts {
        let max = dist.counts.first().map_or(0, |c| c.frequency);
        section.push_str("```\n");
        for count in &dist.counts {
            section.push_str(&format!(
                "{} {} {}\n",
                count.score,
                render_bar(count.frequency, max, options.bar_width),
                count.frequency
            ));
        }
        section.push_str("```\n\n");
    }

    section
}

/// Generate the payment type section.
fn generate_payments_section(payments: &[PaymentTypeSummary], options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Orders by Payment Type\n\n");

    if payments.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    let total: usize = payments.iter().map(|p| p.order_count).sum();
    let max = payments.first().map_or(0, |p| p.order_count);

    section.push_str("| Payment Type | Total Order | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for payment in payments {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            payment.payment_type,
            format_count(payment.order_count),
            payment.order_count as f64 * 100.0 / total as f64
        ));
    }
    section.push('\n');

    if options.include_charts {
        let label_width = payments
            .iter()
            .map(|p| p.payment_type.len())
            .max()
            .unwrap_or(0);

        section.push_str("```\n");
        for payment in payments {
            section.push_str(&format!(
                "{:<width$} {} {}\n",
                payment.payment_type,
                render_bar(payment.order_count, max, options.bar_width),
                payment.order_count,
                width = label_width
            ));
        }
        section.push_str("```\n\n");
    }

    section
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by ecomdash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

/// A bar of `width` cells scaled so that `max` fills it.
///
/// Non-zero values always get at least one cell.
pub fn render_bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 || value == 0 || width == 0 {
        return String::new();
    }

    let cells = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Integer with thousands separators.
pub fn format_count(value: usize) -> String {
    value.to_formatted_string(&Locale::en)
}

/// Amount with thousands separators and two decimals.
pub fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();

    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("???")
}

fn stars(score: u8) -> String {
    format!("{} {}", score, "★".repeat(score.min(5) as usize))
}
