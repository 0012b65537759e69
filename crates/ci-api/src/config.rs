//! Configuration for the harness

use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_URL: &str = "http://localhost:8111";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_COUNT: u32 = 3;

/// Errors from reading the configuration source
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse
    #[error("environment variable '{var}' has invalid value '{value}': {source}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A required value was set but empty
    #[error("environment variable '{var}' must not be empty")]
    Empty { var: &'static str },
}

/// How requests authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`
    Token(String),
    /// HTTP basic auth
    Basic { username: String, password: String },
    /// No authentication header
    Anonymous,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Basic { username, .. } => {
                write!(f, "Basic {{ username: {:?}, password: *** }}", username)
            }
            Credentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Connection settings for the server under test
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the server, without trailing slash
    pub base_url: String,
    pub credentials: Credentials,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts made by calls that opt into retries
    pub retry_count: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            credentials: Credentials::Basic {
                username: DEFAULT_USERNAME.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables
    ///
    /// - `TEAMCITY_URL` (default `http://localhost:8111`)
    /// - `TEAMCITY_TOKEN`, used instead of basic auth when set
    /// - `TEAMCITY_USERNAME` / `TEAMCITY_PASSWORD` (default `admin` / `admin`)
    /// - `TEAMCITY_TIMEOUT_SECS` (default 30)
    /// - `TEAMCITY_RETRY_COUNT` (default 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("TEAMCITY_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    var: "TEAMCITY_URL",
                })
            }
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => DEFAULT_URL.to_string(),
        };

        let credentials = match lookup("TEAMCITY_TOKEN").filter(|t| !t.is_empty()) {
            Some(token) => Credentials::Token(token),
            None => Credentials::Basic {
                username: lookup("TEAMCITY_USERNAME")
                    .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
                password: lookup("TEAMCITY_PASSWORD")
                    .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            },
        };

        let timeout_secs = parse_number(&lookup, "TEAMCITY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let retry_count = parse_number(&lookup, "TEAMCITY_RETRY_COUNT", DEFAULT_RETRY_COUNT)?;

        Ok(Self {
            base_url,
            credentials,
            timeout: Duration::from_secs(timeout_secs),
            retry_count,
        })
    }

    /// Point the configuration at another server
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_number<F, N>(lookup: &F, var: &'static str, default: N) -> Result<N, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    N: std::str::FromStr<Err = ParseIntError>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidNumber {
                var,
                value,
                source,
            }),
        None => Ok(default),
    }
}
