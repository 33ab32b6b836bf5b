//! Job service - composes the store and the scraper into the job lifecycle

use crate::jobs::JobError;
use crate::scrape::{PageReport, PageScraper, RequestModifier};
use crate::store::{Job, JobResult, JobStore, NewJob, StoreError};
use crate::urls::TargetUrl;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Request to create a job
#[derive(Debug, Clone, Default)]
pub struct EnqueueJobRequest {
    /// Caller-chosen id; the store assigns one when `None`
    pub job_id: Option<String>,
    pub urls: Vec<TargetUrl>,
}

impl EnqueueJobRequest {
    pub fn new(urls: Vec<TargetUrl>) -> Self {
        Self { job_id: None, urls }
    }
}

/// Orchestrates job creation, background execution and status reads
///
/// Cloning is cheap; clones share the same store, scraper and shutdown token.
#[derive(Clone)]
pub struct LinkJobService {
    store: Arc<dyn JobStore>,
    scraper: Arc<dyn PageScraper>,
    modifiers: Vec<RequestModifier>,
    shutdown: CancellationToken,
}

impl LinkJobService {
    /// Creates a service over the given store and scraper
    pub fn new(store: Arc<dyn JobStore>, scraper: Arc<dyn PageScraper>) -> Self {
        Self {
            store,
            scraper,
            modifiers: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Sets the request modifiers applied to every page of every job
    pub fn with_modifiers(mut self, modifiers: Vec<RequestModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Stores a new job and starts executing it in the background
    ///
    /// Returns as soon as the job is stored. Execution runs on its own task,
    /// independent of the caller, and its failures are only logged.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// * `StoreError::AlreadyExists` - the requested job id is taken
    pub fn enqueue_job(&self, request: EnqueueJobRequest) -> Result<Job, StoreError> {
        let job = self.store.create_job(NewJob {
            id: request.job_id,
            urls: request.urls,
        })?;

        tracing::info!("Enqueued job {} with {} URLs", job.id, job.urls.len());

        let service = self.clone();
        let job_id = job.id.clone();
        tokio::spawn(async move {
            if let Err(e) = service.execute_job(&job_id).await {
                tracing::error!("Failed to execute job {}: {}", job_id, e);
            }
        });

        Ok(job)
    }

    /// Runs a stored job to completion
    ///
    /// # Stages
    ///
    /// 1. Load the job and mark it running
    /// 2. Scrape every URL
    /// 3. Store the complete result batch
    /// 4. Mark the job finished
    ///
    /// A failing stage stops the rest. Once the job is running, any failure
    /// marks it `Failed`; it is only finished after its results are stored.
    /// A scrape cut short by cancellation stores nothing, and a job without
    /// URLs fails instead of finishing with no results.
    pub async fn execute_job(&self, job_id: &str) -> Result<(), JobError> {
        let job = self.store.get_job(job_id).map_err(|source| JobError::Load {
            job_id: job_id.to_string(),
            source,
        })?;

        let job = self
            .store
            .mark_job_running(&job.id)
            .map_err(|source| JobError::Start {
                job_id: job.id.clone(),
                source,
            })?;

        let total = job.urls.len();
        if total == 0 {
            // An empty batch would never be stored, so the job could not finish
            let err = JobError::NoUrls {
                job_id: job.id.clone(),
            };
            self.mark_failed(&job.id, &err);
            return Err(err);
        }

        tracing::info!("Executing job {} over {} URLs", job.id, total);

        let cancel = self.shutdown.child_token();
        let reports = self
            .scraper
            .scrape_pages(cancel.clone(), job.urls.clone(), self.modifiers.clone())
            .await;

        if cancel.is_cancelled() && reports.len() < total {
            let err = JobError::Cancelled {
                job_id: job.id.clone(),
                completed: reports.len(),
                total,
            };
            self.mark_failed(&job.id, &err);
            return Err(err);
        }

        let succeeded = reports.iter().filter(|report| report.success).count();
        let results = to_job_results(&job.id, reports);

        if let Err(source) = self.store.create_results(results) {
            let err = JobError::StoreResults {
                job_id: job.id.clone(),
                source,
            };
            self.mark_failed(&job.id, &err);
            return Err(err);
        }

        self.store
            .finish_job(&job.id)
            .map_err(|source| JobError::Finish {
                job_id: job.id.clone(),
                source,
            })?;

        tracing::info!(
            "Finished job {}: {} of {} pages succeeded",
            job.id,
            succeeded,
            total
        );

        Ok(())
    }

    /// Returns the result batch of a job
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - no such job
    /// * `StoreError::ResultsNotFound` - the job exists but has no results yet
    pub fn get_job_status(&self, job_id: &str) -> Result<Vec<JobResult>, StoreError> {
        self.store.get_job(job_id)?;
        self.store.get_results(job_id)
    }

    /// Returns a job with its current lifecycle state
    pub fn get_job(&self, job_id: &str) -> Result<Job, StoreError> {
        self.store.get_job(job_id)
    }

    /// Cancels every running job execution
    ///
    /// In-flight page fetches still complete; no new ones start, and the
    /// affected jobs end up `Failed`.
    pub fn cancel_all(&self) {
        tracing::warn!("Cancelling all running jobs");
        self.shutdown.cancel();
    }

    fn mark_failed(&self, job_id: &str, err: &JobError) {
        if let Err(e) = self.store.fail_job(job_id, &err.to_string()) {
            tracing::warn!("Could not mark job {} as failed: {}", job_id, e);
        }
    }
}

/// Converts scrape reports into stored results with fresh ids and timestamps
fn to_job_results(job_id: &str, reports: Vec<PageReport>) -> Vec<JobResult> {
    reports
        .into_iter()
        .map(|report| {
            let now = Utc::now();
            JobResult {
                id: Uuid::new_v4().to_string(),
                job_id: job_id.to_string(),
                page_url: report.page_url,
                internal_links_count: report.internal_links_count,
                external_links_count: report.external_links_count,
                success: report.success,
                error: report.error,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}
