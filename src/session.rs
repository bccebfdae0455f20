//! A loaded dataset plus everything needed to answer filter requests.
//!
//! The session owns the dataset read-only; every dashboard is rebuilt
//! from it on request. Only export bytes are memoized.

use crate::analysis::{
    filter_dataset, monthly_volume, response_breakdown, sample_rows, top_n_by_field,
    FilterCriteria, ResponseClassifier, Selection, Subset, DEFAULT_SAMPLE_ROWS, DEFAULT_TOP_N,
};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::export::ExportCache;
use crate::models::{CategoryField, Dashboard, DashboardMetadata};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Knobs for dashboard construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Rows kept by each top-N table.
    pub top_n: usize,
    /// Rows in the sample listing; 0 disables it.
    pub sample_rows: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

pub struct Session {
    source: String,
    dataset: Dataset,
    classifier: ResponseClassifier,
    options: DashboardOptions,
    export_cache: ExportCache,
}

impl Session {
    pub fn new(
        source: impl Into<String>,
        dataset: Dataset,
        classifier: ResponseClassifier,
        options: DashboardOptions,
    ) -> Self {
        Self {
            source: source.into(),
            dataset,
            classifier,
            options,
            export_cache: ExportCache::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Build criteria, defaulting missing dates to the dataset bounds.
    ///
    /// An empty dataset with no explicit dates yields an unbounded range.
    pub fn criteria(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        product: Selection,
        company: Selection,
    ) -> FilterCriteria {
        let full = FilterCriteria::spanning(&self.dataset)
            .unwrap_or_else(|| FilterCriteria::new(NaiveDate::MIN, NaiveDate::MAX));

        FilterCriteria::new(start.unwrap_or(full.start), end.unwrap_or(full.end))
            .with_product(product)
            .with_company(company)
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Subset<'_> {
        filter_dataset(&self.dataset, criteria)
    }

    /// Filter and derive every summary table.
    pub fn dashboard(&self, criteria: &FilterCriteria) -> Dashboard {
        let started = Instant::now();
        let subset = self.filter(criteria);

        if subset.is_empty() {
            self.warn_unmatched(criteria);
        }

        let n = self.options.top_n;
        let dashboard = Dashboard {
            monthly_volume: monthly_volume(&subset).collect(),
            top_products: top_n_by_field(&subset, CategoryField::Product, n),
            top_companies: top_n_by_field(&subset, CategoryField::Company, n),
            top_states: top_n_by_field(&subset, CategoryField::State, n),
            responses: response_breakdown(&subset, &self.classifier),
            sample: sample_rows(&subset, self.options.sample_rows),
            metadata: DashboardMetadata {
                source: self.source.clone(),
                generated_at: Utc::now(),
                filters: criteria.applied(),
                dataset_records: self.dataset.len(),
                filtered_records: subset.len(),
                top_n: n,
                duration_seconds: started.elapsed().as_secs_f64(),
            },
        };

        debug!(
            "Dashboard built from {} of {} complaints",
            subset.len(),
            self.dataset.len()
        );
        dashboard
    }

    /// CSV bytes for the subset matching `criteria`, cached per subset.
    pub fn export(&mut self, criteria: &FilterCriteria) -> Result<Arc<Vec<u8>>> {
        let subset = filter_dataset(&self.dataset, criteria);
        let bytes = self.export_cache.get_or_encode(&subset)?;
        debug!("Export cache holds {} subsets", self.export_cache.len());
        Ok(bytes)
    }

    /// Explain why a selection produced no rows.
    fn warn_unmatched(&self, criteria: &FilterCriteria) {
        if criteria.is_inverted() {
            // filter_dataset already logged this.
            return;
        }

        let selections = [
            (CategoryField::Product, &criteria.product),
            (CategoryField::Company, &criteria.company),
        ];

        for (field, selection) in selections {
            if let Some(value) = selection.value() {
                if !self.dataset.contains_value(field, value) {
                    warn!("{} '{}' does not occur in the dataset", field, value);
                }
            }
        }

        warn!(
            "No complaints match the filters between {} and {}",
            criteria.start, criteria.end
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load_dataset;

    const SAMPLE_CSV: &str = "\
Date received,Product,Company,Issue,State,Company response to consumer
2021-01-15,X,A,Billing,NY,Closed with explanation
2021-02-10,Y,B,Fees,CA,In progress
2021-02-11,X,B,Fees,CA,Closed with monetary relief
";

    fn create_session() -> Session {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        Session::new(
            "rows.csv",
            dataset,
            ResponseClassifier::default(),
            DashboardOptions::default(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_criteria_default_to_dataset_bounds() {
        let session = create_session();
        let criteria = session.criteria(None, None, Selection::All, Selection::All);
        assert_eq!(criteria.start, date(2021, 1, 15));
        assert_eq!(criteria.end, date(2021, 2, 11));

        let criteria = session.criteria(Some(date(2021, 2, 1)), None, Selection::All, Selection::All);
        assert_eq!(criteria.start, date(2021, 2, 1));
        assert_eq!(criteria.end, date(2021, 2, 11));
    }

    #[test]
    fn test_dashboard_identity_filter() {
        let session = create_session();
        let criteria = session.criteria(None, None, Selection::All, Selection::All);
        let dashboard = session.dashboard(&criteria);

        assert_eq!(dashboard.metadata.filtered_records, 3);
        assert_eq!(dashboard.metadata.dataset_records, 3);
        assert_eq!(dashboard.monthly_volume.total(), 3);
        assert_eq!(dashboard.monthly_volume.rows[0].key, "2021-01");
        assert_eq!(dashboard.monthly_volume.rows[1].key, "2021-02");
        assert_eq!(dashboard.top_products.get("X"), Some(2));
        assert_eq!(dashboard.top_companies.get("B"), Some(2));
        assert_eq!(dashboard.top_states.get("CA"), Some(2));
        assert_eq!(dashboard.responses.get("Positive"), Some(2));
        assert_eq!(dashboard.responses.get("Negative"), Some(1));
        assert_eq!(dashboard.sample.len(), 3);
    }

    #[test]
    fn test_dashboard_is_recomputed_per_criteria() {
        let session = create_session();
        let narrow = session.criteria(None, None, Selection::parse("Y"), Selection::All);
        let wide = session.criteria(None, None, Selection::All, Selection::All);

        assert_eq!(session.dashboard(&narrow).metadata.filtered_records, 1);
        assert_eq!(session.dashboard(&wide).metadata.filtered_records, 3);
        assert_eq!(session.dashboard(&narrow).metadata.filtered_records, 1);
    }

    #[test]
    fn test_dashboard_for_unmatched_selection_is_empty() {
        let session = create_session();
        let criteria = session.criteria(
            Some(date(2021, 1, 1)),
            Some(date(2021, 1, 31)),
            Selection::All,
            Selection::parse("B"),
        );
        let dashboard = session.dashboard(&criteria);

        assert_eq!(dashboard.metadata.filtered_records, 0);
        assert!(dashboard.monthly_volume.is_empty());
        assert!(dashboard.responses.is_empty());
        assert!(dashboard.sample.is_empty());
    }

    #[test]
    fn test_sample_rows_option() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let session = Session::new(
            "rows.csv",
            dataset,
            ResponseClassifier::default(),
            DashboardOptions {
                top_n: 1,
                sample_rows: 0,
            },
        );
        let criteria = session.criteria(None, None, Selection::All, Selection::All);
        let dashboard = session.dashboard(&criteria);

        assert!(dashboard.sample.is_empty());
        assert_eq!(dashboard.top_products.len(), 1);
        assert_eq!(dashboard.metadata.top_n, 1);
    }

    #[test]
    fn test_export_is_cached_per_subset() {
        let mut session = create_session();
        let criteria = session.criteria(None, None, Selection::parse("X"), Selection::All);

        let first = session.export(&criteria).unwrap();
        let second = session.export(&criteria).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let reloaded = load_dataset(first.as_slice()).unwrap();
        assert_eq!(reloaded.len(), 2);
    }
}
