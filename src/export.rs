//! CSV export of a filtered subset.
//!
//! The export carries the source header and every source column, so
//! exporting the full dataset and loading it again yields the same dataset.

use crate::analysis::Subset;
use crate::dataset::ColumnLayout;
use crate::error::Result;
use crate::models::ComplaintRecord;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Default file name for downloads.
pub const DEFAULT_EXPORT_FILE: &str = "filtered_complaints.csv";

/// Date format written to the `Date received` column.
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Write a subset as CSV to any writer.
pub fn write_subset_csv<W: Write>(subset: &Subset<'_>, writer: W) -> Result<()> {
    let dataset = subset.dataset();
    let layout = dataset.layout();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(dataset.headers())?;

    for record in subset.records() {
        csv_writer.write_record(row_fields(record, layout, dataset.headers().len()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Encode a subset as UTF-8 CSV bytes.
pub fn encode_subset_csv(subset: &Subset<'_>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_subset_csv(subset, &mut buffer)?;
    Ok(buffer)
}

/// Lay a record back out in source column order.
fn row_fields(record: &ComplaintRecord, layout: &ColumnLayout, width: usize) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let mut extra = record.extra.iter();

    (0..width)
        .map(|index| match index {
            i if i == layout.date_received => {
                record.received.format(EXPORT_DATE_FORMAT).to_string()
            }
            i if i == layout.product => text(&record.product),
            i if i == layout.company => text(&record.company),
            i if i == layout.issue => text(&record.issue),
            i if i == layout.state => text(&record.state),
            i if i == layout.response => text(&record.response),
            _ => extra.next().cloned().unwrap_or_default(),
        })
        .collect()
}

/// Memoized export bytes, keyed by the exact set of records exported.
///
/// Only valid for the dataset the subsets were taken from.
#[derive(Debug, Default)]
pub struct ExportCache {
    entries: HashMap<Vec<usize>, Arc<Vec<u8>>>,
}

impl ExportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the encoded subset, encoding it only on first request.
    pub fn get_or_encode(&mut self, subset: &Subset<'_>) -> Result<Arc<Vec<u8>>> {
        if let Some(bytes) = self.entries.get(subset.indices()) {
            debug!("Export cache hit ({} rows)", subset.len());
            return Ok(Arc::clone(bytes));
        }

        debug!("Export cache miss, encoding {} rows", subset.len());
        let bytes = Arc::new(encode_subset_csv(subset)?);
        self.entries
            .insert(subset.indices().to_vec(), Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Number of distinct subsets encoded so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Write already-encoded export bytes to a file.
pub fn save_export(bytes: &[u8], path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{filter_dataset, FilterCriteria};
    use crate::dataset::{load_dataset, load_dataset_file};

    const SAMPLE_CSV: &str = "\
Complaint ID,Date received,Product,Issue,Company,State,Consumer complaint narrative,Company response to consumer
1,2021-01-15,Credit card,Billing dispute,Bank A,NY,\"Charged twice, \"\"urgent\"\"\",Closed with explanation
2,02/10/2021,Mortgage,Escrow,Bank B,,,In progress
3,2021-03-05 08:30:00,,Fees,Bank A,CA,\"Line one
line two\",
";

    #[test]
    fn test_full_export_round_trip() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let bytes = encode_subset_csv(&Subset::full(&dataset)).unwrap();

        let reloaded = load_dataset(bytes.as_slice()).unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn test_export_has_header_and_iso_dates() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let bytes = encode_subset_csv(&Subset::full(&dataset)).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Complaint ID,Date received,Product,Issue,Company,State,Consumer complaint narrative,Company response to consumer")
        );
        assert!(text.contains("2,2021-02-10,Mortgage,Escrow,Bank B,,,In progress"));
        assert!(text.contains("3,2021-03-05,,Fees"));
    }

    #[test]
    fn test_export_contains_only_filtered_rows() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let criteria = FilterCriteria::spanning(&dataset)
            .unwrap()
            .with_company("Bank A".into());
        let subset = filter_dataset(&dataset, &criteria);

        let bytes = encode_subset_csv(&subset).unwrap();
        let reloaded = load_dataset(bytes.as_slice()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded
            .records()
            .iter()
            .all(|r| r.company.as_deref() == Some("Bank A")));
    }

    #[test]
    fn test_empty_subset_exports_header_only() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let criteria = FilterCriteria::spanning(&dataset)
            .unwrap()
            .with_product("Nothing".into());
        let subset = filter_dataset(&dataset, &criteria);

        let text = String::from_utf8(encode_subset_csv(&subset).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_export_cache_reuses_bytes_for_same_subset() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let mut cache = ExportCache::new();

        let full = Subset::full(&dataset);
        let first = cache.get_or_encode(&full).unwrap();
        let second = cache.get_or_encode(&Subset::full(&dataset)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let criteria = FilterCriteria::spanning(&dataset)
            .unwrap()
            .with_company("Bank B".into());
        let filtered = filter_dataset(&dataset, &criteria);
        let third = cache.get_or_encode(&filtered).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_save_export_to_file() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let bytes = encode_subset_csv(&Subset::full(&dataset)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        save_export(&bytes, &path).unwrap();

        let reloaded = load_dataset_file(&path, false).unwrap();
        assert_eq!(reloaded, dataset);
    }
}
