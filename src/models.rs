//! Data models for complaint analysis.
//!
//! This module contains the core data structures used throughout
//! the application for representing complaint records, summary tables,
//! and the dashboard built from them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single consumer complaint row.
///
/// Category fields are `None` when the source cell was empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintRecord {
    /// `Date received`, normalized to a calendar date.
    pub received: NaiveDate,
    /// `Product`.
    pub product: Option<String>,
    /// `Company`.
    pub company: Option<String>,
    /// `Issue` (free text).
    pub issue: Option<String>,
    /// `State`.
    pub state: Option<String>,
    /// `Company response to consumer`.
    pub response: Option<String>,
    /// Values of every other source column, in source column order.
    pub extra: Vec<String>,
}

impl ComplaintRecord {
    /// Returns the value of a categorical field.
    pub fn category(&self, field: CategoryField) -> Option<&str> {
        match field {
            CategoryField::Product => self.product.as_deref(),
            CategoryField::Company => self.company.as_deref(),
            CategoryField::State => self.state.as_deref(),
        }
    }

    /// Returns the calendar month this complaint was received in.
    pub fn month(&self) -> MonthKey {
        MonthKey::from(self.received)
    }
}

/// Categorical field used for top-N counts and selector options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryField {
    Product,
    Company,
    State,
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryField::Product => write!(f, "Product"),
            CategoryField::Company => write!(f, "Company"),
            CategoryField::State => write!(f, "State"),
        }
    }
}

/// A (year, month) bucket. Orders chronologically and displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Binary classification of a company response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseClass {
    Positive,
    Negative,
}

impl fmt::Display for ResponseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseClass::Positive => write!(f, "Positive"),
            ResponseClass::Negative => write!(f, "Negative"),
        }
    }
}

impl ResponseClass {
    /// Returns an emoji representation of the class.
    pub fn emoji(&self) -> &'static str {
        match self {
            ResponseClass::Positive => "🟢",
            ResponseClass::Negative => "🔴",
        }
    }
}

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub key: String,
    pub count: usize,
}

/// An ordered mapping from category key to count, driving one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Sum of all counts in the table.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Largest count in the table, or 0 when empty.
    pub fn max_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).max().unwrap_or(0)
    }

    /// Looks up the count for a key.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.rows.iter().find(|r| r.key == key).map(|r| r.count)
    }

    #[allow(dead_code)] // Pairs with is_empty; used in tests
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K: ToString> FromIterator<(K, usize)> for SummaryTable {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|(key, count)| SummaryRow {
                    key: key.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

/// Projection of a record shown in the sample listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRow {
    pub date: NaiveDate,
    pub product: Option<String>,
    pub company: Option<String>,
    pub issue: Option<String>,
}

impl From<&ComplaintRecord> for SampleRow {
    fn from(record: &ComplaintRecord) -> Self {
        Self {
            date: record.received,
            product: record.product.clone(),
            company: record.company.clone(),
            issue: record.issue.clone(),
        }
    }
}

/// Filter values as they were applied, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub product: String,
    pub company: String,
}

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetadata {
    /// Where the dataset was loaded from.
    pub source: String,
    /// Date and time the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Filters used to build the subset.
    pub filters: AppliedFilters,
    /// Number of records in the full dataset.
    pub dataset_records: usize,
    /// Number of records in the filtered subset.
    pub filtered_records: usize,
    /// Row limit applied to top-N tables.
    pub top_n: usize,
    /// Time spent filtering and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// Every derived view for one set of filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    /// Complaints per month, chronological.
    pub monthly_volume: SummaryTable,
    /// Most complained-about products.
    pub top_products: SummaryTable,
    /// Companies with the most complaints.
    pub top_companies: SummaryTable,
    /// States with the most complaints.
    pub top_states: SummaryTable,
    /// Positive vs negative company responses.
    pub responses: SummaryTable,
    /// First rows of the filtered subset.
    pub sample: Vec<SampleRow>,
}
