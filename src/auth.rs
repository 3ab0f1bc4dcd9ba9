//! # Bearer token authorization
//!
//! Requests to the API must carry `Authorization: Bearer <jwt>`.
//! The token is decoded, not verified: the claims must be readable and contain `sub` and `iat`.
//!

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use std::{error, fmt, result};

pub const BEARER: &str = "Bearer";
pub const UNAUTHORIZED: &str = "Missing valid authentication token. \
    Please provide your JWT in the Authorization header as Bearer token.";

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    MissingToken,
    InvalidToken(String),
}

impl Error {
    pub fn invalid_token(desc: impl fmt::Display) -> Error {
        Error::InvalidToken(format!("{desc}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingToken => writeln!(f, "MissingToken"),
            Error::InvalidToken(desc) => writeln!(f, "InvalidToken: {}", desc),
        }
    }
}

impl error::Error for Error {}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::invalid_token(err)
    }
}
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::invalid_token(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, UNAUTHORIZED).into_response()
    }
}

/// The claims the API relies on
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
}

/// The JWT in the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::MissingToken)?
        .to_str()
        .map_err(Error::invalid_token)?;
    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case(BEARER) && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => {
            log::error!("Authorization header is missing the JWT.");
            Err(Error::MissingToken)
        }
    }
}

/// Read the claims of `token`, without checking its signature
pub fn decode(token: &str) -> Result<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(claims), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::invalid_token("a JWT has three parts"));
    };
    let claims = URL_SAFE_NO_PAD.decode(claims.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&claims)?)
}

/// Middleware rejecting the requests without valid claims.
/// The claims are made available to the handlers as a request extension.
pub async fn authorize(mut request: Request, next: Next) -> result::Result<Response, Error> {
    let claims = bearer_token(request.headers()).and_then(decode).map_err(|err| {
        log::info!("Unauthorized request: {err}");
        err
    })?;
    log::info!("Authorized to make requests to the API");
    log::debug!("Request from {}", claims.sub);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
