//! Runtime configuration for the proxy.
//!
//! Configuration is assembled once at startup from three layers, lowest
//! precedence first:
//!
//! 1. Built-in defaults (`127.0.0.1:5000`, country `us`, 30 articles, 10s timeout)
//! 2. An optional YAML file given with `--config`
//! 3. Command-line flags and their environment variables
//!
//! The result is an immutable [`Settings`] value that the server shares with
//! every request by `Arc`. There is no bundled credential: a missing key is
//! reported loudly at startup and surfaces as a configuration error on each
//! headlines request.
//!
//! # Example file
//!
//! ```yaml
//! api_key: abc123
//! bind: 0.0.0.0:8080
//! country: gb
//! page_size: 20
//! upstream_url: https://newsapi.org/v2/top-headlines
//! timeout_secs: 5
//! ```

use crate::cli::Cli;
use crate::error::ProxyError;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Placeholder credential shipped in sample configs.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const DEFAULT_UPSTREAM_URL: &str = "https://newsapi.org/v2/top-headlines";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// NewsAPI refuses page sizes above this.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("country must be a two-letter code, got {0:?}")]
    InvalidCountry(String),

    #[error("page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u32),

    #[error("timeout must be at least one second")]
    InvalidTimeout,
}

/// The fixed parameters sent upstream with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub country: String,
    pub page_size: u32,
}

/// Values read from the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub bind: Option<SocketAddr>,
    pub country: Option<String>,
    pub page_size: Option<u32>,
    pub upstream_url: Option<Url>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let parsed = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        debug!(path, "Parsed config file");
        Ok(parsed)
    }
}

/// Fully resolved configuration, built once at process start.
#[derive(Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    /// `None` when the credential was never supplied.
    pub api_key: Option<String>,
    pub query: HeadlineQuery,
    pub upstream_url: Url,
    pub timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind", &self.bind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("query", &self.query)
            .field("upstream_url", &self.upstream_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Build settings from parsed CLI arguments, reading `--config` if given.
    pub async fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => {
                let file = FileConfig::load(path).await?;
                info!(path = %path, "Loaded config file");
                file
            }
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Layer CLI arguments over file values over defaults, then validate.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.parse().expect("default bind address is valid"));

        let country = cli
            .country
            .clone()
            .or(file.country)
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
            .to_lowercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidCountry(country));
        }

        let page_size = cli.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(page_size));
        }

        let upstream_url = cli.upstream_url.clone().or(file.upstream_url).unwrap_or_else(|| {
            Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid")
        });

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(Self {
            bind,
            api_key,
            query: HeadlineQuery { country, page_size },
            upstream_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The credential to send upstream.
    ///
    /// # Errors
    ///
    /// [`ProxyError::MissingApiKey`] when the key is unset or still the
    /// placeholder value.
    pub fn api_key(&self) -> Result<&str, ProxyError> {
        match self.api_key.as_deref() {
            Some(key) if key != PLACEHOLDER_API_KEY => Ok(key),
            _ => Err(ProxyError::MissingApiKey),
        }
    }
}
