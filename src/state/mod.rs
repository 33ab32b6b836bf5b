//! State module for tracking job progress
//!
//! # Components
//!
//! - `JobState`: Tracks the lifecycle of a job (pending, running, succeeded, failed)

mod job_state;

pub use job_state::JobState;
