//! TOML configuration with defaults for every field.
//!
//! ```toml
//! [entsoe]
//! api_key = "..."
//! in_domain = "10YFI-1--------U"
//! out_domain = "10YFI-1--------U"
//!
//! [fetch]
//! max_attempts = 3
//! timeout_secs = 30
//!
//! [redis]
//! address = "127.0.0.1:6379"
//! key = "entsoe:prices:fi"
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use entsoe_core::endpoint::DEFAULT_BASE_URL;
use entsoe_core::{ApiEndpoint, RetryConfig};
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

pub const API_KEY_ENV: &str = "ENTSOE_API_KEY";

const FINLAND: &str = "10YFI-1--------U";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub entsoe: EntsoeConfig,
    pub fetch: FetchConfig,
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntsoeConfig {
    pub api_key: String,
    pub in_domain: String,
    pub out_domain: String,
    pub base_url: String,
}

impl Default for EntsoeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            in_domain: String::from(FINLAND),
            out_domain: String::from(FINLAND),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub timeout_secs: u64,
    /// Linear backoff step: attempt `n` is followed by `n * backoff_secs`.
    pub backoff_secs: u64,
    /// Bound on the whole fetch; `0` disables it.
    pub deadline_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 30,
            backoff_secs: 2,
            deadline_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedisConfig {
    pub address: String,
    pub username: String,
    pub password: String,
    pub db: i64,
    /// Time-series key the points are written to.
    pub key: String,
    pub labels: BTreeMap<String, String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:6379"),
            username: String::new(),
            password: String::new(),
            db: 0,
            key: String::from("entsoe:prices:fi"),
            labels: BTreeMap::from([
                (String::from("country"), String::from("fi")),
                (String::from("type"), String::from("price")),
            ]),
        }
    }
}

impl RedisConfig {
    /// `redis://` URL with credentials percent-encoded.
    pub fn connection_url(&self) -> String {
        let credentials = match (self.username.is_empty(), self.password.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("{}@", urlencoding::encode(&self.username)),
            (_, false) => format!(
                "{}:{}@",
                urlencoding::encode(&self.username),
                urlencoding::encode(&self.password)
            ),
        };
        format!("redis://{credentials}{}/{}", self.address, self.db)
    }
}

impl Config {
    /// Load `explicit` if given, else the first file on the search path, else defaults.
    /// The API key environment variable wins over the file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(CliError::Config(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => search_paths(env::var_os("HOME").map(PathBuf::from))
                .into_iter()
                .find(|candidate| candidate.is_file()),
        };

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.override_api_key(env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn override_api_key(&mut self, value: Option<String>) {
        if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
            self.entsoe.api_key = value;
        }
    }

    pub fn apply_overrides(&mut self, max_attempts: Option<u32>, timeout_secs: Option<u64>) {
        if let Some(max_attempts) = max_attempts {
            self.fetch.max_attempts = max_attempts;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.fetch.timeout_secs = timeout_secs;
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        let deadline = match self.fetch.deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        RetryConfig::linear(
            Duration::from_secs(self.fetch.backoff_secs),
            self.fetch.max_attempts,
        )
        .with_request_timeout(Duration::from_secs(self.fetch.timeout_secs))
        .with_deadline(deadline)
    }

    pub fn endpoint(&self) -> Result<ApiEndpoint, CliError> {
        if self.entsoe.api_key.trim().is_empty() {
            return Err(CliError::Config(format!(
                "missing ENTSO-E security token: set entsoe.api_key or {API_KEY_ENV}"
            )));
        }
        Ok(ApiEndpoint::new(
            self.entsoe.api_key.clone(),
            self.entsoe.in_domain.clone(),
            self.entsoe.out_domain.clone(),
        )
        .with_base_url(self.entsoe.base_url.clone()))
    }
}

fn search_paths(home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(home) = home.filter(|home| !home.as_os_str().is_empty()) {
        paths.push(home.join(".config").join("entsoe-ingest").join("config.toml"));
        paths.push(home.join(".entsoe-ingest").join("config.toml"));
    }
    paths.push(PathBuf::from("config.toml"));
    paths
}
