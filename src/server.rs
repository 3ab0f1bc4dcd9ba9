//! # HTTP API
//!
//! - `GET /` welcome message
//! - `POST /api/candig/patient` with `{"attributesOfInterest": [...]}` returns the noised counts
//!   of the attributes in every dataset as `{"datasets": {...}}`
//! - `POST /api/candig/percentage` with `{"attributeOfInterest": "...", "term": "..."}` returns
//!   the noised percentage of `term` in every dataset as `{"datasets": {...}}`
//!
//! Every `/api` route goes through [`auth::authorize`].
//!

use crate::{
    auth::{self, Claims},
    candig::{self, Client},
    config::Config,
    differential_privacy::{self, percentage, private_aggregate, DpParameters},
};
use axum::{
    extract::State,
    Extension,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{error, fmt, io, result, sync::Arc};

pub const WELCOME: &str = "Welcome to MESI Search!";
/// Where the patient records are in a count response
pub const PATIENTS_PATH: &str = "/results/patients";

#[derive(Debug)]
pub enum Error {
    BadRequest(String),
    Upstream(String),
    Internal(String),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadRequest(desc) => writeln!(f, "BadRequest: {}", desc),
            Error::Upstream(desc) => writeln!(f, "Upstream: {}", desc),
            Error::Internal(desc) => writeln!(f, "Internal: {}", desc),
        }
    }
}

impl error::Error for Error {}

impl From<differential_privacy::Error> for Error {
    fn from(err: differential_privacy::Error) -> Self {
        match err {
            differential_privacy::Error::InvalidParameters(desc)
            | differential_privacy::Error::InvalidPath(desc) => Error::BadRequest(desc),
            differential_privacy::Error::Other(desc) => Error::Internal(desc),
        }
    }
}
impl From<candig::Error> for Error {
    fn from(err: candig::Error) -> Self {
        match err {
            candig::Error::Upstream(desc) | candig::Error::Request(desc) => Error::Upstream(desc),
            candig::Error::Other(desc) => Error::Internal(desc),
        }
    }
}
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        log::error!("{self}");
        let status = self.status();
        // Only bad requests say what went wrong
        match self {
            Error::BadRequest(desc) => (status, desc).into_response(),
            Error::Upstream(_) => {
                let body = ErrorResponse {
                    error: "upstream service unavailable",
                };
                (status, Json(body)).into_response()
            }
            Error::Internal(_) => {
                let body = ErrorResponse {
                    error: "internal error",
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Shared, read-only, by all the requests
#[derive(Clone, Debug)]
pub struct AppState {
    client: Client,
    parameters: Arc<DpParameters>,
    path: Arc<str>,
}

impl AppState {
    pub fn new(client: Client, parameters: DpParameters) -> Self {
        AppState {
            client,
            parameters: Arc::new(parameters),
            path: Arc::from(PATIENTS_PATH),
        }
    }

    pub fn try_from_config(config: &Config) -> Result<Self> {
        Ok(AppState::new(
            Client::new(config.upstream_api())?,
            config.parameters().clone(),
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub attributes_of_interest: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageRequest {
    pub attribute_of_interest: String,
    pub term: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetsResponse<T> {
    pub datasets: T,
}

async fn home() -> &'static str {
    WELCOME
}

async fn patient_counts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<PatientRequest>,
) -> Result<Json<DatasetsResponse<differential_privacy::NoisedResult>>> {
    let documents = state.client.all_results().await?;
    let release = private_aggregate(
        &documents,
        &request.attributes_of_interest,
        &state.path,
        &state.parameters,
    )?;
    log::info!(
        "Counts of {:?} released to {}, {} spent",
        request.attributes_of_interest,
        claims.sub,
        release.accountant().spent()
    );
    Ok(Json(DatasetsResponse {
        datasets: release.into_result(),
    }))
}

async fn term_percentage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<PercentageRequest>,
) -> Result<Json<DatasetsResponse<percentage::DatasetValues>>> {
    let documents = state.client.all_results().await?;
    let release = percentage::private_percentage(
        &documents,
        &request.attribute_of_interest,
        &request.term,
        &state.path,
        &state.parameters,
    )?;
    log::info!(
        "Percentage of {} in {} released to {}, {} spent",
        request.term,
        request.attribute_of_interest,
        claims.sub,
        release.accountant().spent()
    );
    Ok(Json(DatasetsResponse {
        datasets: release.into_result(),
    }))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/candig/patient", post(patient_counts))
        .route("/candig/percentage", post(term_percentage))
        .layer(middleware::from_fn(auth::authorize));
    Router::new()
        .route("/", get(home))
        .nest("/api", api)
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::try_from_config(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("Listening on {} with {config}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
