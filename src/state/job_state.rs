/// Job state definitions for tracking the lifecycle of a link census job
///
/// This module defines all states a job can be in and which transitions between them are legal.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    // ===== Active States =====
    /// Job has been stored but its execution has not started yet
    Pending,

    /// Job pages are being fetched and classified
    Running,

    // ===== Terminal States =====
    /// A complete result batch was stored and the job is finished
    Succeeded,

    /// Execution stopped before a complete result batch could be stored
    Failed,
}

impl JobState {
    /// Returns true if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if a job in this state may move to `next`
    ///
    /// Legal transitions:
    ///
    /// | From | To |
    /// |------|----|
    /// | Pending | Running, Failed |
    /// | Running | Succeeded, Failed |
    pub fn can_transition_to(&self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Failed)
                | (Self::Running, Self::Succeeded | Self::Failed)
        )
    }

    /// Returns the lowercase name used in logs and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
