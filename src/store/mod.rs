//! Store module for keeping job data in memory
//!
//! This module holds every job and result record for the lifetime of the process:
//! - Job creation with id and timestamp assignment
//! - Lifecycle transitions (running, finished, failed)
//! - Whole-batch result writes and reads
//!
//! Nothing is persisted. Dropping the store drops every job.

mod memory;
mod traits;

pub use memory::InMemoryJobStore;
pub use traits::{JobStore, StoreError, StoreResult};

use crate::state::JobState;
use crate::urls::TargetUrl;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Input for creating a job
///
/// The store assigns a UUID when `id` is `None`.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub id: Option<String>,
    pub urls: Vec<TargetUrl>,
}

impl NewJob {
    pub fn new(urls: Vec<TargetUrl>) -> Self {
        Self { id: None, urls }
    }

    pub fn with_id(id: impl Into<String>, urls: Vec<TargetUrl>) -> Self {
        Self {
            id: Some(id.into()),
            urls,
        }
    }
}

/// Represents a job in the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: String,
    pub urls: Vec<TargetUrl>,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Represents the stored outcome of scraping one page of a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub id: String,
    pub job_id: String,
    pub page_url: String,
    pub internal_links_count: u32,
    pub external_links_count: u32,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
