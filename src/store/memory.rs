//! In-memory store implementation
//!
//! This module provides a lock-guarded implementation of the JobStore trait.

use crate::state::JobState;
use crate::store::traits::{JobStore, StoreError, StoreResult};
use crate::store::{Job, JobResult, NewJob};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Both maps live behind the same lock so a single critical section sees a
/// consistent view of jobs and their results.
#[derive(Debug, Default)]
struct Tables {
    jobs: HashMap<String, Job>,
    results: HashMap<String, Vec<JobResult>>,
}

/// In-memory job store
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    tables: RwLock<Tables>,
}

impl InMemoryJobStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

/// Applies a lifecycle transition to a stored job, rejecting illegal moves
fn transition(job: &mut Job, to: JobState) -> StoreResult<()> {
    if !job.state.can_transition_to(to) {
        return Err(StoreError::InvalidTransition {
            job_id: job.id.clone(),
            from: job.state,
            to,
        });
    }

    job.state = to;
    job.updated_at = Utc::now();
    Ok(())
}

impl JobStore for InMemoryJobStore {
    // ===== Job Management =====

    fn create_job(&self, job: NewJob) -> StoreResult<Job> {
        let mut tables = self.write()?;

        let id = job
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if tables.jobs.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let now = Utc::now();
        let job = Job {
            id: id.clone(),
            urls: job.urls,
            state: JobState::Pending,
            error: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        };
        tables.jobs.insert(id, job.clone());

        Ok(job)
    }

    fn get_job(&self, job_id: &str) -> StoreResult<Job> {
        let tables = self.read()?;
        tables
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))
    }

    fn mark_job_running(&self, job_id: &str) -> StoreResult<Job> {
        let mut tables = self.write()?;
        let job = tables
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;

        transition(job, JobState::Running)?;
        Ok(job.clone())
    }

    fn finish_job(&self, job_id: &str) -> StoreResult<()> {
        let mut tables = self.write()?;
        let job = tables
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;

        transition(job, JobState::Succeeded)?;
        if job.finished_at.is_none() {
            job.finished_at = Some(job.updated_at);
        }

        Ok(())
    }

    fn fail_job(&self, job_id: &str, reason: &str) -> StoreResult<()> {
        let mut tables = self.write()?;
        let job = tables
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;

        transition(job, JobState::Failed)?;
        job.error = Some(reason.to_string());

        Ok(())
    }

    // ===== Result Management =====

    fn create_results(&self, results: Vec<JobResult>) -> StoreResult<()> {
        let Some(first) = results.first() else {
            return Ok(());
        };
        let job_id = first.job_id.clone();

        let mut tables = self.write()?;
        tables.results.insert(job_id, results);

        Ok(())
    }

    fn get_results(&self, job_id: &str) -> StoreResult<Vec<JobResult>> {
        let tables = self.read()?;
        tables
            .results
            .get(job_id)
            .cloned()
            .ok_or_else(|| StoreError::ResultsNotFound(job_id.to_string()))
    }
}
