//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::CategoryField;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// complaint-lens - consumer complaint dashboards from CSV exports
///
/// Filter a complaints CSV by date range, product and company, then
/// summarize monthly volume, top products/companies/states and company
/// response quality into a Markdown or JSON report.
///
/// Examples:
///   complaint-lens --input rows.csv
///   complaint-lens --start 2021-01-01 --end 2021-06-30 --product "Mortgage"
///   complaint-lens --company "Bank A" --format json --output -
///   complaint-lens --product "Credit card" --export
///   complaint-lens --list companies
///   complaint-lens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Complaints CSV to load
    ///
    /// Defaults to rows.csv, or the [general] input config value.
    #[arg(short, long, value_name = "FILE", env = "COMPLAINT_LENS_INPUT")]
    pub input: Option<PathBuf>,

    /// First day to include (YYYY-MM-DD)
    ///
    /// Defaults to the earliest complaint in the dataset.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    ///
    /// Defaults to the latest complaint in the dataset.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Only include this product ("All" for every product)
    #[arg(short, long, value_name = "PRODUCT")]
    pub product: Option<String>,

    /// Only include this company ("All" for every company)
    #[arg(short = 'C', long, value_name = "COMPANY")]
    pub company: Option<String>,

    /// Report output path ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also write the filtered complaints as CSV
    #[arg(long)]
    pub export: bool,

    /// Path for the CSV export (implies --export)
    ///
    /// Defaults to filtered_complaints.csv.
    #[arg(long, value_name = "FILE")]
    pub export_file: Option<PathBuf>,

    /// Rows in each top-N table
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Rows in the sample listing (0 to omit it)
    #[arg(long, value_name = "COUNT")]
    pub sample_rows: Option<usize>,

    /// Omit text bars from Markdown tables
    #[arg(long)]
    pub no_bars: bool,

    /// Print the selector options for a field and exit
    #[arg(long, value_name = "FIELD")]
    pub list: Option<ListField>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .complaint-lens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 when no complaints match the filters
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .complaint-lens.toml configuration file
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

/// Field whose selector options `--list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListField {
    Products,
    Companies,
    States,
}

impl From<ListField> for CategoryField {
    fn from(field: ListField) -> Self {
        match field {
            ListField::Products => CategoryField::Product,
            ListField::Companies => CategoryField::Company,
            ListField::States => CategoryField::State,
        }
    }
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

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top_n == Some(0) {
            return Err("Top-N must be at least 1".to_string());
        }

        // Validate input file if provided
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
