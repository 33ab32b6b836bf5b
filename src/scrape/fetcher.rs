//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of a scrape, including:
//! - Building HTTP clients from the scraper configuration
//! - Request modifiers applied before each GET
//! - Turning a fetched page into a `PageReport`

use crate::config::ScraperConfig;
use crate::scrape::classifier::{classify_body, LinkCounts};
use crate::scrape::ScrapeError;
use crate::urls::TargetUrl;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Request};
use std::sync::Arc;
use std::time::Duration;

/// Mutates an outgoing request before it is sent
///
/// Modifiers run in order; the first error aborts the fetch of that page.
pub type RequestModifier =
    Arc<dyn Fn(&mut Request) -> Result<(), ScrapeError> + Send + Sync + 'static>;

/// Outcome of scraping a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// The page URL as submitted
    pub page_url: String,

    /// Anchors pointing at the page's own host (or relative paths)
    pub internal_links_count: u32,

    /// All other counted anchors
    pub external_links_count: u32,

    /// True when the page was fetched with status < 400 and classified
    pub success: bool,

    /// Why the page failed
    pub error: Option<String>,
}

impl PageReport {
    fn new(page: &TargetUrl) -> Self {
        Self {
            page_url: page.as_str().to_string(),
            internal_links_count: 0,
            external_links_count: 0,
            success: false,
            error: None,
        }
    }

    fn failed(mut self, error: ScrapeError) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self
    }

    fn succeeded(mut self, counts: LinkCounts) -> Self {
        self.internal_links_count = counts.internal;
        self.external_links_count = counts.external;
        self.success = true;
        self
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is not set here; it is attached per request so request
/// modifiers can replace it.
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScrapeError)` - Failed to build client
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, ScrapeError> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(ScrapeError::Client)
}

/// Creates a modifier that sets a header on every request
///
/// # Example
///
/// ```
/// use link_census::scrape::header_modifier;
///
/// let accept_html = header_modifier("Accept", "text/html").unwrap();
/// # let _ = accept_html;
/// ```
pub fn header_modifier(name: &str, value: &str) -> Result<RequestModifier, ScrapeError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ScrapeError::Modifier(format!("invalid header name {:?}: {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::Modifier(format!("invalid header value {:?}: {}", value, e)))?;

    Ok(Arc::new(move |request: &mut Request| -> Result<(), ScrapeError> {
        request.headers_mut().insert(name.clone(), value.clone());
        Ok(())
    }))
}

/// Fetches one page and classifies its links
///
/// # Request Flow
///
/// 1. Build a GET request carrying `user_agent`
/// 2. Apply each modifier in order
///    - First error → failure report, nothing is sent
/// 3. Send the request (no retry)
///    - Transport error → failure report
///    - Status >= 400 → failure report, body is not read
/// 4. Read the body, parse it and count links → success report
///
/// The fetch itself is not interruptible; cancellation is handled by the
/// pipeline around it.
pub async fn fetch_page(
    client: &Client,
    page: &TargetUrl,
    user_agent: &str,
    modifiers: &[RequestModifier],
) -> PageReport {
    let report = PageReport::new(page);

    let mut request = match client
        .get(page.url().clone())
        .header(USER_AGENT, user_agent)
        .build()
    {
        Ok(request) => request,
        Err(e) => return report.failed(ScrapeError::Request(e)),
    };

    for modifier in modifiers {
        if let Err(e) = modifier(&mut request) {
            tracing::debug!("Request modifier rejected {}: {}", page, e);
            return report.failed(e);
        }
    }

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Fetch failed for {}: {}", page, e);
            return report.failed(ScrapeError::Request(e));
        }
    };

    let status = response.status();
    if status.as_u16() >= 400 {
        tracing::debug!("Bad status {} for {}", status, page);
        return report.failed(ScrapeError::BadStatusCode(status.as_u16()));
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return report.failed(ScrapeError::Body(e)),
    };

    let counts = classify_body(page.as_str(), &body);
    tracing::debug!(
        "Classified {}: {} internal, {} external",
        page,
        counts.internal,
        counts.external
    );

    report.succeeded(counts)
}
