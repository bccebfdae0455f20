//! The in-memory complaint dataset.
//!
//! A [`Dataset`] is loaded once and then only ever borrowed: filters
//! produce index views over it, never copies or mutations.

pub mod loader;

pub use loader::*;

use crate::models::{CategoryField, ComplaintRecord};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Sentinel selector value meaning "no filter".
pub const ALL: &str = "All";

pub const DATE_RECEIVED: &str = "Date received";
pub const PRODUCT: &str = "Product";
pub const COMPANY: &str = "Company";
pub const ISSUE: &str = "Issue";
pub const STATE: &str = "State";
pub const COMPANY_RESPONSE: &str = "Company response to consumer";

/// Positions of the typed columns within the source header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date_received: usize,
    pub product: usize,
    pub company: usize,
    pub issue: usize,
    pub state: usize,
    pub response: usize,
}

impl ColumnLayout {
    /// Locates every required column in a header row.
    pub fn from_headers(headers: &[String]) -> crate::error::Result<Self> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(crate::error::DatasetError::MissingColumn(name))
        };

        Ok(Self {
            date_received: find(DATE_RECEIVED)?,
            product: find(PRODUCT)?,
            company: find(COMPANY)?,
            issue: find(ISSUE)?,
            state: find(STATE)?,
            response: find(COMPANY_RESPONSE)?,
        })
    }

    /// Returns true if the column at `index` is one of the typed columns.
    pub fn is_typed(&self, index: usize) -> bool {
        [
            self.date_received,
            self.product,
            self.company,
            self.issue,
            self.state,
            self.response,
        ]
        .contains(&index)
    }
}

/// An ordered, immutable collection of complaint records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    layout: ColumnLayout,
    records: Vec<ComplaintRecord>,
}

impl Dataset {
    /// Builds a dataset from already-parsed parts.
    pub fn new(headers: Vec<String>, layout: ColumnLayout, records: Vec<ComplaintRecord>) -> Self {
        Self {
            headers,
            layout,
            records,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn records(&self) -> &[ComplaintRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest received dates, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.received).min()?;
        let max = self.records.iter().map(|r| r.received).max()?;
        Some((min, max))
    }

    /// Selector options for a field: `"All"` followed by the distinct
    /// non-null values in alphabetical order.
    pub fn selector_options(&self, field: CategoryField) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.category(field))
            .collect();

        std::iter::once(ALL.to_string())
            .chain(distinct.into_iter().map(String::from))
            .collect()
    }

    /// Returns true if any record carries `value` in `field`.
    pub fn contains_value(&self, field: CategoryField, value: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.category(field) == Some(value))
    }
}
