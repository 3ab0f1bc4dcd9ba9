//! # CanDIG upstream API
//!
//! Discovers the datasets exposed by a CanDIG server and fetches their patient counts.
//! Every call is a JSON `POST` relative to the configured base URL.
//!

pub mod query;

use crate::{
    filter::Documents,
    path::{self, Found},
};
use reqwest::header;
use serde_json::Value;
use std::{error, fmt, result};

pub use query::prepare_count_query;

pub const DATASETS_SEARCH: &str = "/datasets/search";
pub const COUNT: &str = "/count";
/// Where the datasets are listed in a dataset search response
pub const DATASETS_PATH: &str = "/results/datasets";

// Error management
#[derive(Debug)]
pub enum Error {
    Upstream(String),
    Request(String),
    Other(String),
}

impl Error {
    pub fn upstream(desc: impl fmt::Display) -> Error {
        Error::Upstream(format!("Upstream error {}", desc))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Upstream(desc) => writeln!(f, "Upstream: {}", desc),
            Error::Request(desc) => writeln!(f, "Request: {}", desc),
            Error::Other(desc) => writeln!(f, "{}", desc),
        }
    }
}

impl error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request(err.to_string())
    }
}
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Other(err.to_string())
    }
}
impl From<path::Error> for Error {
    fn from(err: path::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;

/// A client of the CanDIG API
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Client {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::builder().build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post `body` to `url` (relative to the base URL) and parse the JSON response
    async fn request(&self, url: &str, body: &Value) -> Result<Value> {
        log::info!("CanDIG API call for {url}");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, url))
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let status = response.status();
        log::info!("CanDIG server returned {status}");
        if !status.is_success() {
            return Err(Error::upstream(format!("{url} returned {status}")));
        }
        Ok(response.json().await?)
    }

    /// The ids of all the datasets
    pub async fn datasets(&self) -> Result<Vec<String>> {
        let result = self.request(DATASETS_SEARCH, &query::datasets_query()).await?;
        let datasets = match path::extract(&result, DATASETS_PATH)? {
            Found::One(Value::Array(datasets)) => datasets.iter().collect(),
            found => found.into_vec(),
        };
        Ok(datasets
            .into_iter()
            .filter_map(|dataset| dataset.get("id")?.as_str().map(str::to_string))
            .collect())
    }

    /// The patient counts of one dataset, `None` when there is no dataset id to query
    pub async fn fetch_dataset(&self, dataset_id: Option<&str>) -> Result<Option<Value>> {
        match prepare_count_query(dataset_id) {
            Some(query) => Ok(Some(self.request(COUNT, &query).await?)),
            None => {
                log::debug!("No count query sent");
                Ok(None)
            }
        }
    }

    /// The patient counts of the given datasets, by dataset id
    pub async fn raw_results<S: AsRef<str>>(&self, dataset_ids: &[S]) -> Result<Documents> {
        let mut documents = Documents::new();
        for dataset_id in dataset_ids {
            let dataset_id = dataset_id.as_ref();
            if let Some(document) = self.fetch_dataset(Some(dataset_id)).await? {
                documents.insert(dataset_id.to_string(), document);
            }
        }
        Ok(documents)
    }

    /// The patient counts of all the datasets
    pub async fn all_results(&self) -> Result<Documents> {
        let dataset_ids = self.datasets().await?;
        self.raw_results(&dataset_ids).await
    }
}
