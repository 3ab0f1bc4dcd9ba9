//! # Differentially private releases of category counts
//!
//! The counts extracted by [`crate::filter`] are released through the [`Laplace`] mechanism:
//! each attribute of each dataset gets its own sensitivity, and every count spends
//! `(epsilon, delta)` from an [`Accountant`] owned by the request.
//!

pub mod accountant;
pub mod budget;
pub mod dp_event;
pub mod dp_parameters;
pub mod mechanisms;
pub mod percentage;
pub mod sensitivity;

use crate::{
    filter::{filter, AttributeCounts, CategoryCounts, Documents, FilteredResult},
    path,
};
use std::{error, fmt, ops::Deref, result};

/// Some exports
pub use accountant::Accountant;
pub use budget::Budget;
pub use dp_event::DpEvent;
pub use dp_parameters::DpParameters;
pub use mechanisms::Laplace;
pub use sensitivity::sensitivity;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    InvalidParameters(String),
    InvalidPath(String),
    Other(String),
}

impl Error {
    pub fn invalid_parameters(desc: impl fmt::Display) -> Error {
        Error::InvalidParameters(format!("{desc}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameters(desc) => writeln!(f, "InvalidParameters: {}", desc),
            Error::InvalidPath(desc) => writeln!(f, "InvalidPath: {}", desc),
            Error::Other(err) => writeln!(f, "{}", err),
        }
    }
}

impl From<path::Error> for Error {
    fn from(err: path::Error) -> Self {
        match err {
            path::Error::InvalidPath(desc) => Error::InvalidPath(desc),
        }
    }
}
impl From<statrs::StatsError> for Error {
    fn from(err: statrs::StatsError) -> Self {
        Error::Other(err.to_string())
    }
}

impl error::Error for Error {}
pub type Result<T> = result::Result<T, Error>;

/// Same shape as [`FilteredResult`], every count noised
pub type NoisedResult = FilteredResult;

/// A private result with the accountant that paid for it
#[derive(Clone, Debug)]
pub struct PrivateRelease<T> {
    result: T,
    accountant: Accountant,
}

impl<T> PrivateRelease<T> {
    pub fn new(result: T, accountant: Accountant) -> Self {
        PrivateRelease { result, accountant }
    }

    pub fn result(&self) -> &T {
        &self.result
    }

    pub fn accountant(&self) -> &Accountant {
        &self.accountant
    }

    pub fn into_result(self) -> T {
        self.result
    }
}

impl<T> Deref for PrivateRelease<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.result
    }
}

impl<T> From<PrivateRelease<T>> for (T, Accountant) {
    fn from(value: PrivateRelease<T>) -> Self {
        (value.result, value.accountant)
    }
}

/// Noise all the counts of one attribute, with the sensitivity of that attribute
pub fn randomize(mechanism: &mut Laplace, counts: &CategoryCounts) -> Result<CategoryCounts> {
    mechanism.configure(sensitivity(counts))?;
    counts
        .iter()
        .map(|(category, count)| Ok((category.clone(), mechanism.randomize(*count)?)))
        .collect()
}

/// Filter the `attributes` out of `documents` and release their counts privately.
///
/// A new mechanism and accountant are built from `parameters` for each call,
/// so calls never draw from each other's budget.
pub fn private_aggregate<S: AsRef<str>>(
    documents: &Documents,
    attributes: &[S],
    path: &str,
    parameters: &DpParameters,
) -> Result<PrivateRelease<NoisedResult>> {
    let filtered = filter(documents, attributes, path)?;
    let mut mechanism = parameters.laplace()?;
    let mut noised = NoisedResult::new();
    for (dataset_id, attributes) in &filtered {
        let noised_attributes: AttributeCounts = attributes
            .iter()
            .map(|(attribute, counts)| Ok((attribute.clone(), randomize(&mut mechanism, counts)?)))
            .collect::<Result<_>>()?;
        noised.insert(dataset_id.clone(), noised_attributes);
    }
    log::info!(
        "Released {} datasets, {} spent",
        noised.len(),
        mechanism.accountant().spent()
    );
    Ok(PrivateRelease::new(noised, mechanism.into_accountant()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const PATH: &str = "/results/patients";

    fn patients(cancer: u64, heart: u64) -> Value {
        json!({
            "results": {
                "patients": [
                    {"causeOfDeath": {"Cancer": cancer, "Heart": heart}}
                ]
            }
        })
    }

    fn documents() -> Documents {
        Documents::from([
            ("dataset-1".to_string(), patients(32, 23)),
            ("dataset-2".to_string(), patients(11, 33)),
        ])
    }

    #[test]
    fn test_private_aggregate_shape() {
        let parameters = DpParameters::from_epsilon_delta(1., 0.);
        let release =
            private_aggregate(&documents(), &["causeOfDeath"], PATH, &parameters).unwrap();
        let filtered = filter(&documents(), &["causeOfDeath"], PATH).unwrap();
        assert_eq!(release.len(), filtered.len());
        for (dataset_id, attributes) in &filtered {
            for (attribute, counts) in attributes {
                let noised = &release[dataset_id][attribute];
                assert_eq!(noised.keys().collect::<Vec<_>>(), counts.keys().collect::<Vec<_>>());
            }
        }
        // one release per count
        assert_eq!(release.accountant().dp_event().len(), 4);
        assert_eq!(release.accountant().spent(), Budget::new(4., 0.));
    }

    #[test]
    fn test_private_aggregate_is_noisy() {
        let parameters = DpParameters::from_epsilon_delta(0.5, 0.);
        let mut differs = false;
        for _ in 0..50 {
            let (noised, _): (NoisedResult, Accountant) =
                private_aggregate(&documents(), &["causeOfDeath"], PATH, &parameters)
                    .unwrap()
                    .into();
            differs |= noised["dataset-1"]["causeOfDeath"]["Cancer"] != 32
                || noised["dataset-1"]["causeOfDeath"]["Heart"] != 23;
        }
        assert!(differs);
    }

    #[test]
    fn test_private_aggregate_does_not_mutate_documents() {
        let documents = documents();
        let before = documents.clone();
        let parameters = DpParameters::from_epsilon_delta(1., 0.);
        private_aggregate(&documents, &["causeOfDeath"], PATH, &parameters).unwrap();
        assert_eq!(documents, before);
    }

    #[test]
    fn test_private_aggregate_exhausted_budget() {
        // Enough budget for the two counts of the first dataset only
        let parameters = DpParameters::from_epsilon_delta(1., 0.).with_budget(Budget::new(2., 0.));
        let release =
            private_aggregate(&documents(), &["causeOfDeath"], PATH, &parameters).unwrap();
        assert!(release.accountant().is_exhausted());
        assert_eq!(
            release["dataset-2"]["causeOfDeath"],
            CategoryCounts::from([("Cancer".to_string(), 0), ("Heart".to_string(), 0)])
        );
    }

    #[test]
    fn test_private_aggregate_errors() {
        let parameters = DpParameters::from_epsilon_delta(1., 0.);
        assert!(matches!(
            private_aggregate(&documents(), &["causeOfDeath"], "results//patients", &parameters),
            Err(Error::InvalidPath(_))
        ));
        let parameters = DpParameters::from_epsilon_delta(-1., 0.);
        assert!(matches!(
            private_aggregate(&documents(), &["causeOfDeath"], PATH, &parameters),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_private_aggregate_empty_inputs() {
        let parameters = DpParameters::from_epsilon_delta(1., 0.);
        let no_attributes: [&str; 0] = [];
        assert!(private_aggregate(&documents(), &no_attributes, PATH, &parameters)
            .unwrap()
            .is_empty());
        assert!(private_aggregate(&Documents::new(), &["causeOfDeath"], PATH, &parameters)
            .unwrap()
            .is_empty());
    }
}
