//! # Private sums and percentages
//!
//! What share of the patients of each dataset fall in one category of an attribute,
//! e.g. the percentage of `causeOfDeath` that is `Cancer`.
//!

use super::{sensitivity::MIN_SENSITIVITY, DpParameters, Laplace, PrivateRelease, Result};
use crate::filter::{filter, CategoryCounts, Documents};
use std::collections::BTreeMap;

/// A real value by dataset id
pub type DatasetValues = BTreeMap<String, f64>;

/// The count of `term` in `counts`, matching labels case-insensitively.
/// Counts saturate at `u64::MAX`.
pub fn term_count(counts: &CategoryCounts, term: &str) -> Option<u64> {
    let term = term.to_lowercase();
    counts
        .iter()
        .filter(|(category, _)| category.to_lowercase() == term)
        .map(|(_, count)| *count)
        .reduce(u64::saturating_add)
}

/// Private sum of the counts.
///
/// The counts are bounded by `(min, sum)`, so the sensitivity is the largest bound
/// in absolute value. The sum saturates at `u64::MAX`.
/// Nothing is released once the mechanism has no budget left.
pub fn private_sum(counts: &CategoryCounts, mechanism: &mut Laplace) -> Result<f64> {
    if mechanism.is_exhausted() {
        return Ok(0.);
    }
    let lower = counts.values().copied().min().unwrap_or(0);
    let upper = counts.values().copied().fold(0, u64::saturating_add);
    mechanism.configure_f64(lower.max(upper).max(MIN_SENSITIVITY) as f64)?;
    mechanism.randomize_f64(upper as f64)
}

/// The percentage of `term` in each dataset: `100 * count(term) / sum`.
///
/// Datasets without `term` or without a sum are left out; a zero sum gives `0`.
pub fn percentage(
    counts: &BTreeMap<String, CategoryCounts>,
    sums: &DatasetValues,
    term: &str,
) -> DatasetValues {
    if term.is_empty() {
        return DatasetValues::new();
    }
    counts
        .iter()
        .filter_map(|(dataset_id, counts)| {
            let count = term_count(counts, term)?;
            let sum = *sums.get(dataset_id)?;
            let percentage = if sum != 0. { 100. * count as f64 / sum } else { 0. };
            Some((dataset_id.clone(), percentage))
        })
        .collect()
}

/// Release the percentage of `term` among the counts of `attribute`, for each dataset.
///
/// Both the count of `term` and the sum of the counts are noised, each spending from the
/// same per-call accountant.
pub fn private_percentage(
    documents: &Documents,
    attribute: &str,
    term: &str,
    path: &str,
    parameters: &DpParameters,
) -> Result<PrivateRelease<DatasetValues>> {
    let filtered = filter(documents, &[attribute], path)?;
    let mut mechanism = parameters.laplace()?;
    let mut noised_counts = BTreeMap::new();
    let mut sums = DatasetValues::new();
    for (dataset_id, attributes) in &filtered {
        let Some(counts) = attributes.get(attribute) else {
            continue;
        };
        let Some(count) = term_count(counts, term) else {
            continue;
        };
        mechanism.configure(super::sensitivity(counts))?;
        let noised = mechanism.randomize(count)?;
        noised_counts.insert(
            dataset_id.clone(),
            CategoryCounts::from([(term.to_string(), noised)]),
        );
        sums.insert(dataset_id.clone(), private_sum(counts, &mut mechanism)?);
    }
    Ok(PrivateRelease::new(
        percentage(&noised_counts, &sums, term),
        mechanism.into_accountant(),
    ))
}
