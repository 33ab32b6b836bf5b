//! Jobs module - the lifecycle of a link census job
//!
//! A job goes through:
//! 1. Enqueue: the job is stored as `Pending` and execution is detached
//! 2. Execute: pages are scraped and the full result batch is stored
//! 3. Poll: callers read the result batch once it exists

mod service;

pub use service::{EnqueueJobRequest, LinkJobService};

use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while executing a job
///
/// These never reach the caller that enqueued the job; the background task
/// logs them.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to fetch job {job_id}: {source}")]
    Load {
        job_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to mark job {job_id} as running: {source}")]
    Start {
        job_id: String,
        #[source]
        source: StoreError,
    },

    #[error("job {job_id} has no URLs to scrape")]
    NoUrls { job_id: String },

    #[error("job {job_id} was cancelled after {completed} of {total} pages")]
    Cancelled {
        job_id: String,
        completed: usize,
        total: usize,
    },

    #[error("failed to create results for job {job_id}: {source}")]
    StoreResults {
        job_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to mark job {job_id} as finished: {source}")]
    Finish {
        job_id: String,
        #[source]
        source: StoreError,
    },
}
