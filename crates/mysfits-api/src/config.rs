use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TABLE: &str = "MysfitsTable";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// In-process store seeded with the bundled catalog.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                var: "MYSFITS_STORE",
                value: s.to_string(),
                reason: "expected dynamodb or memory",
            }),
        }
    }
}

/// Service configuration read from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub mysfits_table: String,
    pub store: StoreBackend,
    /// Firehose delivery stream for clicks; `None` logs clicks instead.
    pub clicks_delivery_stream: Option<String>,
    pub request_timeout: Duration,
    /// Permissive CORS, enabled only for development.
    pub permissive_cors: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
                reason: "expected a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let store = match get("MYSFITS_STORE") {
            Some(raw) => raw.trim().parse()?,
            None => StoreBackend::DynamoDb,
        };

        let request_timeout = match get("REQUEST_TIMEOUT") {
            Some(raw) => parse_timeout(raw.trim()).ok_or(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT",
                value: raw,
                reason: "expected a duration such as 10s or 1m",
            })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let permissive_cors = get("APP_ENV")
            .map(|env| env.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        Ok(Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            mysfits_table: get("MYSFITS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            store,
            clicks_delivery_stream: get("CLICKS_DELIVERY_STREAM"),
            request_timeout,
            permissive_cors,
        })
    }
}

/// Parse a timeout string: humantime shorthand ("10s", "1m30s") or raw seconds.
/// Zero is rejected.
fn parse_timeout(s: &str) -> Option<Duration> {
    let duration = humantime::parse_duration(s)
        .ok()
        .or_else(|| s.parse::<u64>().ok().map(Duration::from_secs))?;

    (!duration.is_zero()).then_some(duration)
}
