//! Link-Census: counts internal and external links across batches of pages
//!
//! Callers submit a list of URLs as a job. Each page is fetched concurrently,
//! its anchors are classified against the page's own host, and the per-page
//! counts are stored for polling once the whole batch is done.

pub mod api;
pub mod config;
pub mod jobs;
pub mod scrape;
pub mod state;
pub mod store;
pub mod urls;

use thiserror::Error;

/// Main error type for Link-Census operations
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Scrape error: {0}")]
    Scrape(#[from] scrape::ScrapeError),

    #[error("Job error: {0}")]
    Job(#[from] jobs::JobError),

    #[error("URL list error: {0}")]
    UrlList(#[from] urls::UrlListError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Result type alias for Link-Census operations
pub type Result<T> = std::result::Result<T, CensusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use jobs::{EnqueueJobRequest, LinkJobService};
pub use scrape::{PageReport, PageScraper, Scraper};
pub use state::JobState;
pub use store::{InMemoryJobStore, Job, JobResult, JobStore};
