//! Scrape pipeline - bounded fan-out/fan-in over a batch of URLs
//!
//! A scrape runs as three kinds of tasks:
//! - a dispatcher that hands URLs out one at a time
//! - a fixed pool of workers that fetch and classify pages
//! - a supervisor that waits for all of them and then closes the report stream
//!
//! Every in-flight scrape holds a token on the scraper's task tracker so that
//! `close` can wait for outstanding work to drain.

use crate::config::ScraperConfig;
use crate::scrape::fetcher::{build_http_client, fetch_page, PageReport, RequestModifier};
use crate::scrape::ScrapeError;
use crate::urls::TargetUrl;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Default number of workers per scrape
pub const DEFAULT_CONCURRENCY: usize = 1000;

/// User agent sent with every page request unless a modifier replaces it
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:97.0) Gecko/20100101 Firefox/97.0";

/// Something that can scrape a batch of pages
///
/// The job service depends on this trait rather than on `Scraper` directly so
/// tests can substitute canned reports.
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Scrapes every URL and collects one report per URL
    ///
    /// Reports come back in completion order. If `cancel` fires, fewer reports
    /// than URLs may be returned, but never duplicates.
    async fn scrape_pages(
        &self,
        cancel: CancellationToken,
        urls: Vec<TargetUrl>,
        modifiers: Vec<RequestModifier>,
    ) -> Vec<PageReport>;

    /// Waits for all in-flight scrapes to finish, bounded by `deadline`
    ///
    /// # Errors
    ///
    /// * `ScrapeError::CloseTimeout` - work was still running at the deadline;
    ///   it keeps running but is no longer waited for
    async fn close(&self, deadline: Duration) -> Result<(), ScrapeError>;
}

/// Concurrent page scraper
#[derive(Clone)]
pub struct Scraper {
    client: Client,
    concurrency: usize,
    user_agent: Arc<str>,
    tracker: TaskTracker,
}

impl Scraper {
    /// Creates a scraper from configuration, building its own HTTP client
    ///
    /// # Errors
    ///
    /// * `ScrapeError::BadConcurrency` - concurrency is zero
    /// * `ScrapeError::Client` - the HTTP client could not be built
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = build_http_client(config)?;
        Self::with_client(client, config.concurrency, &config.user_agent)
    }

    /// Creates a scraper around an existing HTTP client
    pub fn with_client(
        client: Client,
        concurrency: usize,
        user_agent: &str,
    ) -> Result<Self, ScrapeError> {
        if concurrency == 0 {
            return Err(ScrapeError::BadConcurrency(concurrency));
        }

        Ok(Self {
            client,
            concurrency,
            user_agent: Arc::from(user_agent),
            tracker: TaskTracker::new(),
        })
    }

    /// Returns the configured worker pool size
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the number of scrapes that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Starts a scrape and returns the stream of reports
    ///
    /// The receiver yields reports as workers finish them and returns `None`
    /// once every worker has exited, so it can be drained with a plain loop.
    /// Must be called from within a tokio runtime.
    pub fn scrape_stream(
        &self,
        cancel: CancellationToken,
        urls: Vec<TargetUrl>,
        modifiers: Vec<RequestModifier>,
    ) -> mpsc::Receiver<PageReport> {
        let in_flight = self.tracker.token();
        let worker_count = self.concurrency.min(urls.len()).max(1);

        let (url_tx, url_rx) = mpsc::channel::<TargetUrl>(1);
        let (report_tx, report_rx) = mpsc::channel::<PageReport>(worker_count);

        let dispatcher = tokio::spawn(dispatch(cancel.clone(), urls, url_tx));

        let url_rx = Arc::new(Mutex::new(url_rx));
        let modifiers: Arc<[RequestModifier]> = modifiers.into();
        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            workers.spawn(work(
                cancel.clone(),
                self.client.clone(),
                Arc::clone(&self.user_agent),
                Arc::clone(&modifiers),
                Arc::clone(&url_rx),
                report_tx.clone(),
            ));
        }
        drop(report_tx);

        // Completion barrier: the stream closes when the last worker drops its
        // sender, and the tracker token is released only after that.
        tokio::spawn(async move {
            let _in_flight = in_flight;

            if let Err(e) = dispatcher.await {
                tracing::error!("URL dispatcher panicked: {}", e);
            }
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Scrape worker panicked: {}", e);
                }
            }
        });

        report_rx
    }
}

#[async_trait]
impl PageScraper for Scraper {
    async fn scrape_pages(
        &self,
        cancel: CancellationToken,
        urls: Vec<TargetUrl>,
        modifiers: Vec<RequestModifier>,
    ) -> Vec<PageReport> {
        let total = urls.len();
        let mut reports = Vec::with_capacity(total);

        let mut stream = self.scrape_stream(cancel, urls, modifiers);
        while let Some(report) = stream.recv().await {
            reports.push(report);
        }

        tracing::debug!("Scrape produced {} of {} reports", reports.len(), total);
        reports
    }

    async fn close(&self, deadline: Duration) -> Result<(), ScrapeError> {
        self.tracker.close();

        let in_flight = self.tracker.len();
        if in_flight > 0 {
            tracing::info!("Waiting for {} in-flight scrapes to finish", in_flight);
        }

        match tokio::time::timeout(deadline, self.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(ScrapeError::CloseTimeout(deadline)),
        }
    }
}

/// Offers URLs one at a time until the list runs out or the scrape is cancelled
///
/// Dropping `url_tx` on return closes the channel for the workers.
async fn dispatch(
    cancel: CancellationToken,
    urls: Vec<TargetUrl>,
    url_tx: mpsc::Sender<TargetUrl>,
) {
    for url in urls {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Dispatch cancelled");
                return;
            }
            sent = url_tx.send(url) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

/// Pulls URLs and pushes reports until the URL channel closes or the scrape is cancelled
async fn work(
    cancel: CancellationToken,
    client: Client,
    user_agent: Arc<str>,
    modifiers: Arc<[RequestModifier]>,
    urls: Arc<Mutex<mpsc::Receiver<TargetUrl>>>,
    reports: mpsc::Sender<PageReport>,
) {
    loop {
        let next = {
            let mut urls = urls.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                url = urls.recv() => url,
            }
        };
        let Some(url) = next else {
            return;
        };

        let report = fetch_page(&client, &url, &user_agent, &modifiers).await;

        // A finished report is delivered if there is room for it; cancellation
        // only wins while the worker would otherwise block.
        tokio::select! {
            biased;
            sent = reports.send(report) => {
                if sent.is_err() {
                    return;
                }
            }
            _ = cancel.cancelled() => return,
        }
    }
}
