//! complaint-lens - consumer complaint dashboards from CSV exports
//!
//! Loads a complaints CSV once, filters it by date range, product and
//! company, and writes the derived dashboard as a Markdown or JSON
//! report, optionally alongside a CSV export of the filtered rows.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, bad CSV, unparseable date, etc.)
//!   2 - No complaints matched and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod export;
mod models;
mod report;
mod session;

use analysis::{ResponseClassifier, Selection};
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use models::{CategoryField, Dashboard};
use report::MarkdownOptions;
use session::{DashboardOptions, Session};
use std::path::Path;
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

    // Load configuration before logging so [general] verbose applies
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(&args, &config);

    info!("complaint-lens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .complaint-lens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to set the input file, default filters, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, filter, aggregate, and write outputs. Returns exit code (0 or 2).
fn run(args: &Args, config: &Config) -> Result<i32> {
    let input = Path::new(&config.general.input);
    let dataset = dataset::load_dataset_file(input, !args.quiet)
        .with_context(|| format!("Failed to load complaints from {}", input.display()))?;
    if dataset.is_empty() {
        warn!("{} contains no complaints", input.display());
    } else {
        info!("Loaded {} complaints", dataset.len());
    }

    let classifier = ResponseClassifier::new(config.classifier.positive_responses.clone());
    debug!(
        "Positive responses: {:?}",
        classifier.positive_responses().collect::<Vec<_>>()
    );
    let options = DashboardOptions {
        top_n: config.report.top_n,
        sample_rows: config.report.sample_rows,
    };
    let mut session = Session::new(config.general.input.clone(), dataset, classifier, options);

    // Handle --list: print selector options and exit
    if let Some(field) = args.list {
        print_options(session.dataset(), field.into());
        return Ok(0);
    }

    let criteria = session.criteria(
        config.filter.start,
        config.filter.end,
        Selection::parse(&config.filter.product),
        Selection::parse(&config.filter.company),
    );
    info!(
        "Filtering {} to {} (product: {}, company: {})",
        criteria.start, criteria.end, criteria.product, criteria.company
    );

    let dashboard = session.dashboard(&criteria);

    // Render the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(
            &dashboard,
            MarkdownOptions {
                bars: config.report.bars,
            },
        ),
    };

    let to_stdout = config.general.output == "-";
    if to_stdout {
        print!("{}", output);
    } else {
        std::fs::write(&config.general.output, &output)
            .with_context(|| format!("Failed to write report to {}", config.general.output))?;
    }

    // Write the CSV export
    if config.export.enabled {
        let bytes = session.export(&criteria)?;
        let path = Path::new(&config.export.file);
        export::save_export(&bytes, path)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        if !to_stdout {
            println!(
                "📥 Exported {} complaints to {}",
                dashboard.metadata.filtered_records,
                path.display()
            );
        }
    }

    if !to_stdout {
        print_summary(&dashboard, &config.general.output);
    }

    if dashboard.metadata.filtered_records == 0 {
        if args.fail_on_empty {
            eprintln!("\n⛔ No complaints matched the filters. Failing (exit code 2).");
            return Ok(2);
        }
        warn!("Report written for an empty selection");
    }

    Ok(0)
}

/// Print the terminal summary after a report is written.
fn print_summary(dashboard: &Dashboard, output: &str) {
    let meta = &dashboard.metadata;

    println!("\n📊 Dashboard Summary:");
    println!(
        "   Complaints: {} of {} ({} to {})",
        meta.filtered_records, meta.dataset_records, meta.filters.start, meta.filters.end
    );
    if let Some(top) = dashboard.top_products.rows.first() {
        println!("   Top product: {} ({})", top.key, top.count);
    }
    if let Some(top) = dashboard.top_companies.rows.first() {
        println!("   Top company: {} ({})", top.key, top.count);
    }
    println!(
        "   Responses: 🟢 Positive: {} | 🔴 Negative: {}",
        dashboard.responses.get("Positive").unwrap_or(0),
        dashboard.responses.get("Negative").unwrap_or(0)
    );
    println!("\n✅ Report saved to: {}", output);
}

/// Print `"All"` plus every distinct value of a field, one per line.
fn print_options(dataset: &dataset::Dataset, field: CategoryField) {
    let options = dataset.selector_options(field);
    debug!("{} selector has {} options", field, options.len());

    for option in options {
        println!("{}", option);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location; a broken default file is not fatal
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", config::CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
