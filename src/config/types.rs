use crate::scrape::{DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for link-census
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// How long shutdown waits for in-flight scrapes (seconds)
    #[serde(rename = "shutdown-timeout")]
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            shutdown_timeout: 30,
        }
    }
}

/// Scrape pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Number of workers per scrape
    pub concurrency: usize,

    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total time allowed for one page request (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,

    /// Extra headers added to every page request
    pub headers: BTreeMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: 30,
            connect_timeout: 10,
            headers: BTreeMap::new(),
        }
    }
}
