//! Store traits and error types
//!
//! This module defines the trait interface for job stores and
//! associated error types.

use crate::state::JobState;
use crate::store::{Job, JobResult, NewJob};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job already exists: {0}")]
    AlreadyExists(String),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job results not found: {0}")]
    ResultsNotFound(String),

    #[error("invalid job state transition for {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: String,
        from: JobState,
        to: JobState,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for job store implementations
///
/// Implementations must be safe to share between the request handlers and the
/// background execution tasks. Every method is a single atomic operation; there
/// is no way to group several calls into one transaction.
pub trait JobStore: Send + Sync {
    // ===== Job Management =====

    /// Creates a new job in the `Pending` state
    ///
    /// Assigns a UUID when the job carries no id, and stamps `created_at` and
    /// `updated_at` with the current time.
    ///
    /// # Errors
    ///
    /// * `StoreError::AlreadyExists` - a job with the same id is stored; the
    ///   existing record is left untouched
    fn create_job(&self, job: NewJob) -> StoreResult<Job>;

    /// Gets a job by id
    fn get_job(&self, job_id: &str) -> StoreResult<Job>;

    /// Moves a pending job to `Running`
    fn mark_job_running(&self, job_id: &str) -> StoreResult<Job>;

    /// Marks a running job as `Succeeded` and stamps `finished_at`
    ///
    /// `finished_at` is only stamped once; it never moves or clears afterwards.
    fn finish_job(&self, job_id: &str) -> StoreResult<()>;

    /// Marks an active job as `Failed` with the given reason
    fn fail_job(&self, job_id: &str, reason: &str) -> StoreResult<()>;

    // ===== Result Management =====

    /// Replaces the result batch of a job
    ///
    /// The batch is filed under the `job_id` of the first result; callers pass
    /// results of a single job only. An empty batch is a no-op.
    fn create_results(&self, results: Vec<JobResult>) -> StoreResult<()>;

    /// Gets the result batch of a job
    ///
    /// # Errors
    ///
    /// * `StoreError::ResultsNotFound` - no batch has been written yet
    fn get_results(&self, job_id: &str) -> StoreResult<Vec<JobResult>>;
}
