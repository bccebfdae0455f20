//! Summary tables derived from a filtered subset.
//!
//! Every function here is pure: the same subset always yields the same
//! table, and no state survives between calls.

use super::classifier::ResponseClassifier;
use super::filter::Subset;
use crate::models::{CategoryField, MonthKey, SampleRow, SummaryTable};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Default number of rows kept by top-N tables.
pub const DEFAULT_TOP_N: usize = 10;

/// Default number of sample rows.
pub const DEFAULT_SAMPLE_ROWS: usize = 20;

/// Count keys, keeping first-encounter order.
pub fn count_in_encounter_order<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match position.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// Sort counts descending. The sort is stable, so ties keep encounter order.
pub fn sort_by_count_desc<K>(counts: &mut [(K, usize)]) {
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
}

/// Complaints per calendar month, ascending by month.
pub fn monthly_volume(subset: &Subset<'_>) -> impl Iterator<Item = (MonthKey, usize)> {
    let mut months: BTreeMap<MonthKey, usize> = BTreeMap::new();

    for record in subset.records() {
        *months.entry(record.month()).or_default() += 1;
    }

    months.into_iter()
}

/// The `n` most frequent non-null values of `field`.
pub fn top_n_by_field(subset: &Subset<'_>, field: CategoryField, n: usize) -> SummaryTable {
    let mut counts = count_in_encounter_order(subset.records().filter_map(|r| r.category(field)));

    sort_by_count_desc(&mut counts);
    counts.truncate(n);

    counts.into_iter().collect()
}

/// Positive/negative response counts, largest first.
///
/// Labels that never occur are omitted.
pub fn response_breakdown(subset: &Subset<'_>, classifier: &ResponseClassifier) -> SummaryTable {
    let mut counts = count_in_encounter_order(
        subset
            .records()
            .map(|r| classifier.classify(r.response.as_deref())),
    );

    sort_by_count_desc(&mut counts);

    counts.into_iter().collect()
}

/// The first `n` records of the subset, projected for display.
pub fn sample_rows(subset: &Subset<'_>, n: usize) -> Vec<SampleRow> {
    subset.records().take(n).map(SampleRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::filter::{filter_dataset, FilterCriteria};
    use crate::dataset::{load_dataset, Dataset};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_dataset() -> Dataset {
        let csv_data = "\
Date received,Product,Company,Issue,State,Company response to consumer
2021-03-02,Mortgage,Bank B,Escrow,TX,Closed with explanation
2021-01-15,Credit card,Bank A,Billing,NY,In progress
2021-03-20,Credit card,Bank A,Billing,NY,Closed with monetary relief
2020-12-31,Mortgage,Bank C,Fees,,Closed
2021-01-01,Debt collection,Bank A,Calls,CA,
2021-03-05,Credit card,Bank B,Fees,CA,Closed with non-monetary relief
";
        load_dataset(csv_data.as_bytes()).unwrap()
    }

    #[test]
    fn test_count_in_encounter_order() {
        let counts = count_in_encounter_order(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(counts, vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_monthly_volume_is_chronological() {
        let dataset = create_test_dataset();
        let subset = Subset::full(&dataset);

        let months: Vec<(String, usize)> = monthly_volume(&subset)
            .map(|(m, c)| (m.to_string(), c))
            .collect();

        assert_eq!(
            months,
            vec![
                ("2020-12".to_string(), 1),
                ("2021-01".to_string(), 2),
                ("2021-03".to_string(), 3),
            ]
        );
        assert_eq!(months.iter().map(|(_, c)| c).sum::<usize>(), subset.len());
    }

    #[test]
    fn test_top_n_sorted_descending_with_stable_ties() {
        let dataset = create_test_dataset();
        let subset = Subset::full(&dataset);

        let products = top_n_by_field(&subset, CategoryField::Product, DEFAULT_TOP_N);
        assert_eq!(products.rows[0].key, "Credit card");
        assert_eq!(products.rows[0].count, 3);
        // Mortgage is seen before Debt collection.
        assert_eq!(products.rows[1].key, "Mortgage");
        assert_eq!(products.rows[2].key, "Debt collection");

        let companies = top_n_by_field(&subset, CategoryField::Company, 2);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies.get("Bank A"), Some(3));
        assert_eq!(companies.get("Bank B"), Some(2));
    }

    #[test]
    fn test_top_n_skips_nulls() {
        let dataset = create_test_dataset();
        let subset = Subset::full(&dataset);

        let states = top_n_by_field(&subset, CategoryField::State, DEFAULT_TOP_N);
        assert_eq!(states.total(), 5);
        assert_eq!(states.get("NY"), Some(2));
        assert_eq!(states.get("CA"), Some(2));
        assert_eq!(states.get("TX"), Some(1));
    }

    #[test]
    fn test_top_n_never_exceeds_limit() {
        let mut csv_data =
            String::from("Date received,Product,Company,Issue,State,Company response to consumer\n");
        for i in 0..25 {
            for _ in 0..=i % 4 {
                csv_data.push_str(&format!("2021-01-01,P{i},C,I,S,R\n"));
            }
        }
        let dataset = load_dataset(csv_data.as_bytes()).unwrap();
        let subset = Subset::full(&dataset);

        let top = top_n_by_field(&subset, CategoryField::Product, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert!(top.rows.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_response_breakdown_partitions_subset() {
        let dataset = create_test_dataset();
        let subset = Subset::full(&dataset);

        let responses = response_breakdown(&subset, &ResponseClassifier::default());
        assert_eq!(responses.get("Positive"), Some(3));
        assert_eq!(responses.get("Negative"), Some(3));
        assert_eq!(responses.total(), subset.len());
        assert_eq!(responses.len(), 2);
    }

    #[test]
    fn test_sample_rows_keep_subset_order() {
        let dataset = create_test_dataset();
        let subset = Subset::full(&dataset);

        let sample = sample_rows(&subset, 2);
        assert_eq!(sample.len(), 2);
        assert_eq!(sample[0].date, date(2021, 3, 2));
        assert_eq!(sample[1].date, date(2021, 1, 15));
        assert_eq!(sample[1].issue.as_deref(), Some("Billing"));

        assert_eq!(sample_rows(&subset, DEFAULT_SAMPLE_ROWS).len(), 6);
    }

    #[test]
    fn test_worked_example() {
        let csv_data = "\
Date received,Product,Company,Issue,State,Company response to consumer
2021-01-15,X,A,Billing,NY,Closed with explanation
2021-02-10,Y,B,Fees,CA,In progress
";
        let dataset = load_dataset(csv_data.as_bytes()).unwrap();
        let criteria = FilterCriteria::new(date(2021, 1, 1), date(2021, 1, 31));
        let subset = filter_dataset(&dataset, &criteria);

        assert_eq!(subset.len(), 1);

        let months: Vec<(String, usize)> = monthly_volume(&subset)
            .map(|(m, c)| (m.to_string(), c))
            .collect();
        assert_eq!(months, vec![("2021-01".to_string(), 1)]);

        let responses = response_breakdown(&subset, &ResponseClassifier::default());
        assert_eq!(responses.rows.len(), 1);
        assert_eq!(responses.rows[0].key, "Positive");
        assert_eq!(responses.rows[0].count, 1);
    }

    #[test]
    fn test_aggregations_on_empty_subset() {
        let dataset = create_test_dataset();
        let criteria = FilterCriteria::new(date(2030, 1, 1), date(2030, 12, 31));
        let subset = filter_dataset(&dataset, &criteria);

        assert_eq!(monthly_volume(&subset).count(), 0);
        assert!(top_n_by_field(&subset, CategoryField::Product, 10).is_empty());
        assert!(response_breakdown(&subset, &ResponseClassifier::default()).is_empty());
        assert!(sample_rows(&subset, 20).is_empty());
    }
}
