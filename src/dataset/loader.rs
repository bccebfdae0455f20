//! CSV loading for complaint exports.
//!
//! Expected columns (any order, extra columns are kept):
//!   Date received, Product, Company, Issue, State, Company response to consumer
//!
//! The whole load fails on the first malformed row or unparseable date.

use super::{ColumnLayout, Dataset};
use crate::error::{DatasetError, Result};
use crate::models::ComplaintRecord;
use chrono::{NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Date-only formats accepted for `Date received`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Date-time formats accepted for `Date received` (time is discarded).
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// How often the spinner message is refreshed.
const PROGRESS_EVERY: usize = 10_000;

/// Parse a `Date received` cell.
pub fn parse_received_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Load a dataset from any CSV reader.
#[allow(dead_code)] // In-memory entry point; the binary loads from files
pub fn load_dataset<R: Read>(reader: R) -> Result<Dataset> {
    load_with_progress(reader, None)
}

/// Load a dataset from a CSV file path, optionally showing a spinner.
pub fn load_dataset_file(path: &Path, show_progress: bool) -> Result<Dataset> {
    info!("Loading complaints from {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let progress = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Reading complaints...");
        pb
    });

    let result = load_with_progress(file, progress.as_ref());

    if let Some(pb) = progress {
        match &result {
            Ok(dataset) => pb.finish_with_message(format!("Loaded {} complaints", dataset.len())),
            Err(_) => pb.abandon_with_message("Load failed"),
        }
    }

    result
}

fn load_with_progress<R: Read>(reader: R, progress: Option<&ProgressBar>) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| DatasetError::Csv { line: 1, source })?
        .iter()
        .map(String::from)
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;
    debug!("Column layout: {:?}", layout);

    // Physical line numbers; quoted cells may span several lines.
    let mut last_line = 1;
    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result.map_err(|source| {
            let line = source.position().map_or(last_line + 1, |pos| pos.line());
            DatasetError::Csv { line, source }
        })?;
        let line = row.position().map_or(last_line + 1, |pos| pos.line());
        last_line = line;
        records.push(parse_row(&row, &layout, line)?);

        if let Some(pb) = progress {
            if records.len() % PROGRESS_EVERY == 0 {
                pb.set_message(format!("Read {} complaints...", records.len()));
            }
        }
    }

    debug!("Parsed {} records with {} columns", records.len(), headers.len());
    Ok(Dataset::new(headers, layout, records))
}

fn parse_row(row: &csv::StringRecord, layout: &ColumnLayout, line: u64) -> Result<ComplaintRecord> {
    let cell = |index: usize| -> Option<String> {
        row.get(index)
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    let raw_date = row.get(layout.date_received).unwrap_or("");
    let received = parse_received_date(raw_date).ok_or_else(|| DatasetError::InvalidDate {
        line,
        value: raw_date.to_string(),
    })?;

    let extra = row
        .iter()
        .enumerate()
        .filter(|(index, _)| !layout.is_typed(*index))
        .map(|(_, value)| value.to_string())
        .collect();

    Ok(ComplaintRecord {
        received,
        product: cell(layout.product),
        company: cell(layout.company),
        issue: cell(layout.issue),
        state: cell(layout.state),
        response: cell(layout.response),
        extra,
    })
}
