//! # MESI Search
//! Differentially private counts over the clinical datasets of a CanDIG server
//!
//! ## What does it do?
//! For each dataset exposed by the upstream CanDIG API, MESI Search fetches the aggregated
//! patient record, keeps the attributes of interest (mappings from category label to count)
//! and releases every count through the Laplace mechanism.
//! Each request owns a privacy [`differential_privacy::Accountant`]: once its budget is spent,
//! the remaining counts are released as `0`.
//!
//! ### Pipeline
//! [`path`] locates values in the JSON documents, [`filter`] extracts the category counts
//! of one record per dataset, [`differential_privacy`] noises them and [`server`] exposes
//! the result over HTTP.
//!

pub mod auth;
pub mod candig;
pub mod config;
pub mod differential_privacy;
pub mod filter;
pub mod path;
pub mod server;
pub mod setup;

pub use differential_privacy::{private_aggregate, DpParameters, NoisedResult, PrivateRelease};
pub use filter::{filter, Documents, FilteredResult};
pub use path::{extract, Found, Path};
