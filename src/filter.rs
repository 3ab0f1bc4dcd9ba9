//! # Attribute filtering
//!
//! Pulls the attributes of interest out of the per-dataset documents returned by the upstream API.
//! Each attribute is a mapping from category label to count, nested in a patient record.
//!

use crate::path::{Found, Path, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-dataset documents, by dataset id
pub type Documents = BTreeMap<String, Value>;
/// Counts by category label
pub type CategoryCounts = BTreeMap<String, u64>;
/// Category counts by attribute name
pub type AttributeCounts = BTreeMap<String, CategoryCounts>;
/// Attribute counts by dataset id
pub type FilteredResult = BTreeMap<String, AttributeCounts>;

/// The records found at `path`.
/// An array contributes its elements, an object is a record by itself.
fn records<'a>(document: &'a Value, path: &Path) -> Vec<&'a Value> {
    match path.extract(document) {
        Found::One(Value::Array(items)) => items.iter().collect(),
        Found::One(record @ Value::Object(_)) => vec![record],
        Found::Many(records) => records,
        Found::One(_) | Found::Zero => vec![],
    }
}

/// Read a category count mapping, dropping the entries that are not non-negative integers
fn category_counts(attribute: &str, value: &Value) -> Option<CategoryCounts> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.iter()
            .filter_map(|(category, count)| match count.as_u64() {
                Some(count) => Some((category.clone(), count)),
                None => {
                    log::warn!("Dropping {attribute}/{category}: {count} is not a count");
                    None
                }
            })
            .collect(),
    )
}

/// Extract the attributes of interest of a single record
fn attribute_counts(record: &Value, attributes: &[(String, Path)]) -> AttributeCounts {
    attributes
        .iter()
        .filter_map(|(name, path)| {
            let value: Option<&Value> = path.extract(record).into();
            Some((name.clone(), category_counts(name, value?)?))
        })
        .collect()
}

/// Return, for each dataset, the category counts of the requested `attributes`.
///
/// `path` locates the patient records in each document.
/// Only datasets with exactly one record at `path` are kept: the upstream API returns
/// a single aggregated record per dataset and anything else is silently skipped.
/// Attributes that are absent from the record, or are not mappings, are left out.
pub fn filter<S: AsRef<str>>(
    documents: &Documents,
    attributes: &[S],
    path: &str,
) -> Result<FilteredResult> {
    if documents.is_empty() || attributes.is_empty() {
        return Ok(FilteredResult::new());
    }
    let path: Path = path.parse()?;
    let attributes = attributes
        .iter()
        .map(|attribute| {
            let attribute = attribute.as_ref();
            Ok((attribute.to_string(), attribute.parse::<Path>()?))
        })
        .collect::<Result<Vec<(String, Path)>>>()?;
    let mut filtered = FilteredResult::new();
    for (dataset_id, document) in documents {
        // TODO: decide how datasets returning several records should be merged
        match records(document, &path).as_slice() {
            [record] => {
                filtered.insert(dataset_id.clone(), attribute_counts(record, &attributes));
            }
            others => log::debug!(
                "Skipping dataset {dataset_id}: {} records found at {path}",
                others.len()
            ),
        }
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Error;
    use serde_json::json;

    fn patients(cancer: u64, heart: u64) -> Value {
        json!({
            "results": {
                "patients": [
                    {"causeOfDeath": {"Cancer": cancer, "Heart": heart}}
                ]
            }
        })
    }

    fn counts<const N: usize>(values: [(&str, u64); N]) -> CategoryCounts {
        values.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_filter() {
        let documents = Documents::from([("dataset-1".to_string(), patients(32, 23))]);
        let filtered = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        assert_eq!(
            filtered,
            FilteredResult::from([(
                "dataset-1".to_string(),
                AttributeCounts::from([(
                    "causeOfDeath".to_string(),
                    counts([("Cancer", 32), ("Heart", 23)])
                )])
            )])
        );
    }

    #[test]
    fn test_filter_isolates_datasets() {
        let documents = Documents::from([
            ("dataset-1".to_string(), patients(32, 23)),
            ("dataset-2".to_string(), patients(11, 33)),
        ]);
        let filtered = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        assert_eq!(filtered["dataset-1"]["causeOfDeath"], counts([("Cancer", 32), ("Heart", 23)]));
        assert_eq!(filtered["dataset-2"]["causeOfDeath"], counts([("Cancer", 11), ("Heart", 33)]));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let documents = Documents::from([
            ("dataset-1".to_string(), patients(32, 23)),
            ("dataset-2".to_string(), patients(11, 33)),
        ]);
        let first = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        let second = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_skips_ambiguous_datasets() {
        let documents = Documents::from([
            ("well-formed".to_string(), patients(32, 23)),
            ("no-record".to_string(), json!({"results": {"patients": []}})),
            ("no-path".to_string(), json!({"results": {}})),
            (
                "two-records".to_string(),
                json!({"results": {"patients": [
                    {"causeOfDeath": {"Cancer": 1}},
                    {"causeOfDeath": {"Cancer": 2}}
                ]}}),
            ),
        ]);
        let filtered = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["well-formed"]);
    }

    #[test]
    fn test_filter_empty_inputs() {
        let documents = Documents::from([("dataset-1".to_string(), patients(32, 23))]);
        let no_attributes: [&str; 0] = [];
        assert!(filter(&documents, &no_attributes, "/results/patients").unwrap().is_empty());
        assert!(filter(&Documents::new(), &["causeOfDeath"], "/results/patients")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_filter_malformed_path() {
        let documents = Documents::from([("dataset-1".to_string(), patients(32, 23))]);
        assert!(matches!(
            filter(&documents, &["causeOfDeath"], "/results//patients"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            filter(&documents, &["cause//OfDeath"], "/results/patients"),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_filter_attributes() {
        let documents = Documents::from([(
            "dataset-1".to_string(),
            json!({"results": {"patients": [{
                "causeOfDeath": {"Cancer": 3, "Unknown": "n/a", "Negative": -1},
                "gender": "Female",
                "dateOfBirth": {}
            }]}}),
        )]);
        let filtered = filter(
            &documents,
            &["causeOfDeath", "gender", "dateOfBirth", "race"],
            "/results/patients",
        )
        .unwrap();
        let dataset = &filtered["dataset-1"];
        // Malformed counts are dropped, non mapping attributes and missing ones are left out
        assert_eq!(dataset["causeOfDeath"], counts([("Cancer", 3)]));
        assert_eq!(dataset["dateOfBirth"], CategoryCounts::new());
        assert!(!dataset.contains_key("gender"));
        assert!(!dataset.contains_key("race"));
    }

    #[test]
    fn test_filter_single_object_record() {
        let documents = Documents::from([(
            "dataset-1".to_string(),
            json!({"results": {"patients": {"causeOfDeath": {"Cancer": 7, "Heart": 2}}}}),
        )]);
        let filtered = filter(&documents, &["causeOfDeath"], "/results/patients").unwrap();
        assert_eq!(filtered["dataset-1"]["causeOfDeath"], counts([("Cancer", 7), ("Heart", 2)]));
    }

    #[test]
    fn test_filter_wildcard_records() {
        let documents = Documents::from([("dataset-1".to_string(), patients(5, 6))]);
        let filtered = filter(&documents, &["causeOfDeath"], "/results/patients/*").unwrap();
        assert_eq!(filtered["dataset-1"]["causeOfDeath"], counts([("Cancer", 5), ("Heart", 6)]));
    }
}
