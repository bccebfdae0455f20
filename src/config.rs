//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.complaint-lens.toml` files.

use crate::analysis::{DEFAULT_POSITIVE_RESPONSES, DEFAULT_SAMPLE_ROWS, DEFAULT_TOP_N};
use crate::dataset::ALL;
use crate::export::DEFAULT_EXPORT_FILE;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".complaint-lens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Default filter values.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Response classification settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the complaints CSV.
    #[serde(default = "default_input")]
    pub input: String,

    /// Report output path (`-` for stdout).
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_input() -> String {
    "rows.csv".to_string()
}

fn default_output() -> String {
    "complaint_report.md".to_string()
}

/// Filter defaults. Dates are quoted `YYYY-MM-DD` strings; omitted dates
/// fall back to the dataset's earliest and latest complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,

    /// Product selection, `"All"` for no filter.
    #[serde(default = "default_selection")]
    pub product: String,

    /// Company selection, `"All"` for no filter.
    #[serde(default = "default_selection")]
    pub company: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            product: default_selection(),
            company: default_selection(),
        }
    }
}

fn default_selection() -> String {
    ALL.to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows in each top-N table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Rows in the sample listing (0 to omit).
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Draw text bars next to counts in Markdown tables.
    #[serde(default = "default_true")]
    pub bars: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            sample_rows: default_sample_rows(),
            bars: true,
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_sample_rows() -> usize {
    DEFAULT_SAMPLE_ROWS
}

fn default_true() -> bool {
    true
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write the filtered subset on every run.
    #[serde(default)]
    pub enabled: bool,

    /// Export file path.
    #[serde(default = "default_export_file")]
    pub file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: default_export_file(),
        }
    }
}

fn default_export_file() -> String {
    DEFAULT_EXPORT_FILE.to_string()
}

/// Response classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Exact `Company response to consumer` values counted as positive.
    #[serde(default = "default_positive_responses")]
    pub positive_responses: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            positive_responses: default_positive_responses(),
        }
    }
}

fn default_positive_responses() -> Vec<String> {
    DEFAULT_POSITIVE_RESPONSES
        .into_iter()
        .map(String::from)
        .collect()
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

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Filters
        if args.start.is_some() {
            self.filter.start = args.start;
        }
        if args.end.is_some() {
            self.filter.end = args.end;
        }
        if let Some(ref product) = args.product {
            self.filter.product = product.clone();
        }
        if let Some(ref company) = args.company {
            self.filter.company = company.clone();
        }

        // Report
        if let Some(top_n) = args.top_n {
            self.report.top_n = top_n;
        }
        if let Some(sample_rows) = args.sample_rows {
            self.report.sample_rows = sample_rows;
        }
        if args.no_bars {
            self.report.bars = false;
        }

        // Export: naming a file implies exporting
        if let Some(ref file) = args.export_file {
            self.export.file = file.display().to_string();
            self.export.enabled = true;
        }
        if args.export {
            self.export.enabled = true;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check merged settings that the CLI parser cannot see.
    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            bail!("[report] top_n must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
