//! Filter stage: date range plus optional product/company equality.

use crate::dataset::{Dataset, ALL};
use crate::models::{AppliedFilters, ComplaintRecord};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

/// A categorical selector value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No constraint.
    #[default]
    All,
    /// Exact equality with the given value.
    Only(String),
}

impl Selection {
    /// Parse a selector value; the sentinel `"All"` means no filter.
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    /// Returns true if a record's field value passes this selection.
    ///
    /// A null field only passes `All`.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => value == Some(selected.as_str()),
        }
    }

    /// The selected value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        Selection::parse(s)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", ALL),
            Selection::Only(v) => write!(f, "{}", v),
        }
    }
}

/// Date range (inclusive on both ends) and categorical selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub product: Selection,
    pub company: Selection,
}

impl FilterCriteria {
    /// Criteria over a date range with no categorical constraints.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            product: Selection::All,
            company: Selection::All,
        }
    }

    /// Criteria covering the whole dataset. `None` if the dataset is empty.
    pub fn spanning(dataset: &Dataset) -> Option<Self> {
        dataset
            .date_bounds()
            .map(|(start, end)| Self::new(start, end))
    }

    pub fn with_product(mut self, product: Selection) -> Self {
        self.product = product;
        self
    }

    pub fn with_company(mut self, company: Selection) -> Self {
        self.company = company;
        self
    }

    /// True when start is after end; such criteria match nothing.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Returns true if the record passes every constraint.
    pub fn matches(&self, record: &ComplaintRecord) -> bool {
        self.start <= record.received
            && record.received <= self.end
            && self.product.matches(record.product.as_deref())
            && self.company.matches(record.company.as_deref())
    }

    /// Display form of the criteria for reports.
    pub fn applied(&self) -> AppliedFilters {
        AppliedFilters {
            start: self.start,
            end: self.end,
            product: self.product.to_string(),
            company: self.company.to_string(),
        }
    }
}

/// The records of a dataset that passed a filter, in dataset order.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// A subset containing every record.
    #[allow(dead_code)] // Identity view; used by tests
    pub fn full(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the subset's records within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over the records in subset order.
    pub fn records(&self) -> impl Iterator<Item = &'a ComplaintRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }
}

/// Apply criteria to a dataset.
pub fn filter_dataset<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> Subset<'a> {
    if criteria.is_inverted() {
        warn!(
            "Start date {} is after end date {}; no complaints match",
            criteria.start, criteria.end
        );
        return Subset {
            dataset,
            indices: Vec::new(),
        };
    }

    let indices: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect();

    debug!(
        "Filter kept {} of {} complaints",
        indices.len(),
        dataset.len()
    );

    Subset { dataset, indices }
}
