//! Scrape module for fetching pages and counting their links
//!
//! This module contains the page-level engine, including:
//! - HTTP fetching with request modifiers
//! - Internal/external link classification
//! - The bounded worker pool with cancellation and draining

mod classifier;
mod fetcher;
mod pipeline;

pub use classifier::{classify_body, classify_links, LinkCounts};
pub use fetcher::{build_http_client, fetch_page, header_modifier, PageReport, RequestModifier};
pub use pipeline::{PageScraper, Scraper, DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};

use std::time::Duration;
use thiserror::Error;

/// Errors raised while scraping pages
///
/// Per-page variants end up as text in `PageReport::error`; only
/// `BadConcurrency`, `Client` and `CloseTimeout` reach callers directly.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("bad concurrency value: {0}")]
    BadConcurrency(usize),

    #[error("bad status code: {0}")]
    BadStatusCode(u16),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("request modifier failed: {0}")]
    Modifier(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("close took longer than deadline of {0:?}")]
    CloseTimeout(Duration),
}
