//! # Service configuration
//!
//! Read once at startup from the environment.
//!
//! | Variable             | Default          |
//! |----------------------|------------------|
//! | `CANDIG_UPSTREAM_API`| required         |
//! | `DP_EPSILON`         | `1.0`            |
//! | `DP_DELTA`           | `0.0`            |
//! | `DP_BUDGET_EPSILON`  | unbounded        |
//! | `DP_BUDGET_DELTA`    | unbounded        |
//! | `BIND_ADDRESS`       | `127.0.0.1:5000` |
//!

use crate::differential_privacy::{self, Budget, DpParameters};
use std::{collections::HashMap, env, error, fmt, net::SocketAddr, result, str::FromStr};

pub const UPSTREAM_API: &str = "CANDIG_UPSTREAM_API";
pub const EPSILON: &str = "DP_EPSILON";
pub const DELTA: &str = "DP_DELTA";
pub const BUDGET_EPSILON: &str = "DP_BUDGET_EPSILON";
pub const BUDGET_DELTA: &str = "DP_BUDGET_DELTA";
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";

pub const DEFAULT_EPSILON: f64 = 1.;
pub const DEFAULT_DELTA: f64 = 0.;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    Missing(String),
    Invalid(String),
}

impl Error {
    pub fn missing(variable: impl fmt::Display) -> Error {
        Error::Missing(format!("{variable} is not set"))
    }
    pub fn invalid(variable: impl fmt::Display, desc: impl fmt::Display) -> Error {
        Error::Invalid(format!("{variable}: {desc}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Missing(desc) => writeln!(f, "Missing: {}", desc),
            Error::Invalid(desc) => writeln!(f, "Invalid: {}", desc),
        }
    }
}

impl error::Error for Error {}

impl From<differential_privacy::Error> for Error {
    fn from(err: differential_privacy::Error) -> Self {
        Error::Invalid(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    upstream_api: String,
    parameters: DpParameters,
    bind_address: SocketAddr,
}

/// Parse `variable` if it is set
fn parse<T>(vars: &HashMap<String, String>, variable: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    vars.get(variable)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|err| Error::invalid(variable, format!("'{value}' {err}")))
        })
        .transpose()
}

impl Config {
    pub fn new(
        upstream_api: impl Into<String>,
        parameters: DpParameters,
        bind_address: SocketAddr,
    ) -> Result<Config> {
        parameters.validate()?;
        Ok(Config {
            upstream_api: upstream_api.into(),
            parameters,
            bind_address,
        })
    }

    /// Build the configuration out of `(variable, value)` pairs
    pub fn from_vars<I, K, V>(vars: I) -> Result<Config>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let upstream_api = vars
            .get(UPSTREAM_API)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::missing(UPSTREAM_API))?;
        let unbounded = Budget::unbounded();
        let budget = Budget::new(
            parse(&vars, BUDGET_EPSILON)?.unwrap_or(unbounded.epsilon()),
            parse(&vars, BUDGET_DELTA)?.unwrap_or(unbounded.delta()),
        );
        let parameters = DpParameters::new(
            parse(&vars, EPSILON)?.unwrap_or(DEFAULT_EPSILON),
            parse(&vars, DELTA)?.unwrap_or(DEFAULT_DELTA),
            budget,
        );
        let bind_address: SocketAddr = match parse(&vars, BIND_ADDRESS)? {
            Some(address) => address,
            None => DEFAULT_BIND_ADDRESS
                .parse()
                .map_err(|err| Error::invalid(BIND_ADDRESS, err))?,
        };
        Config::new(upstream_api.trim(), parameters, bind_address)
    }

    pub fn from_env() -> Result<Config> {
        Config::from_vars(env::vars())
    }

    pub fn upstream_api(&self) -> &str {
        &self.upstream_api
    }

    pub fn parameters(&self) -> &DpParameters {
        &self.parameters
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "upstream {} ε = {} δ = {} budget {} on {}",
            self.upstream_api,
            self.parameters.epsilon(),
            self.parameters.delta(),
            self.parameters.budget(),
            self.bind_address
        )
    }
}
