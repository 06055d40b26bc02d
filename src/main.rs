//! ecomdash - E-commerce order analytics dashboard
//!
//! A CLI tool that loads an order dataset once, restricts it to a date
//! range, and renders the monthly order trend, product rankings, review
//! score distribution, and payment methods as a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable dataset, bad timestamps, etc.)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{Dashboard, DateRange};
use report::RenderOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Log level depends on the merged config
    let config = match prepare_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(args.quiet));

    info!("ecomdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Effective config: {:?}", config);

    if let Err(e) = run_dashboard(&args, &config) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ecomdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the dataset path, date range, and report options.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, filter, aggregate and render the dashboard.
fn run_dashboard(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    let data_path = PathBuf::from(&config.general.data);
    let output_path = PathBuf::from(&config.general.output);

    if !args.quiet {
        println!("📥 Loading orders: {}", data_path.display());
    }
    let dataset = loader::load_dataset(&data_path, !args.quiet)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;
    if dataset.is_empty() {
        warn!("Dataset {} contains no records", data_path.display());
    } else {
        info!("Loaded {} records", dataset.len());
    }

    let column = config.filter.date_column;
    let bounds = dataset.date_bounds(column);
    debug!("Dataset spans {:?} by {}", bounds, column);

    let range = DateRange::resolve(config.filter.start, config.filter.end, bounds)?;
    if range.is_none() {
        warn!("Dataset has no {} values; using all records", column);
    }

    let dashboard = analysis::build_dashboard(&dataset, range, column, config.report.top_n);
    if dashboard.is_empty() {
        warn!("No records fall inside the selected date range");
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&dashboard, &RenderOptions::from(&config.report))
        }
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        print_summary(&dashboard, start_time.elapsed().as_secs_f64());
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            output_path.display()
        );
    }

    Ok(())
}

/// Print a short console summary of the dashboard.
fn print_summary(dashboard: &Dashboard, duration: f64) {
    let meta = &dashboard.metadata;

    println!("\n📊 Dashboard Summary:");
    match meta.date_range {
        Some(range) => println!("   Date range: {} (by {})", range, meta.date_column),
        None => println!("   Date range: entire dataset"),
    }
    println!(
        "   Records: {} of {}",
        report::generator::format_count(meta.selected_records),
        report::generator::format_count(meta.total_records)
    );
    println!(
        "   Revenue in range (2016-2018): {}",
        report::generator::format_money(dashboard.total_revenue())
    );
    if let Some(best) = dashboard.best_selling.first() {
        println!(
            "   Best seller: {} ({})",
            best.category,
            report::generator::format_count(best.order_count)
        );
    }
    match dashboard.review_scores.mode {
        Some(score) => println!("   Most frequent review score: {}", score),
        None => println!("   Most frequent review score: no data"),
    }
    if let Some(top) = dashboard.payment_types.first() {
        println!("   Top payment method: {}", top.payment_type);
    }
    println!("   Duration: {:.2}s", duration);
}

/// Load the config file, apply CLI overrides, and check the result.
fn prepare_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
