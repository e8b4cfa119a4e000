//! Asynchronous job snapshots
//!
//! A job is an asynchronous backend operation identified by an opaque
//! token and polled until it reaches a terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-reported job state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Scheduled,
    Running,
    Success,
    Error,
}

impl JobState {
    /// Whether no further progress will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobState::Success)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Scheduled => write!(f, "SCHEDULED"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Success => write!(f, "SUCCESS"),
            JobState::Error => write!(f, "ERROR"),
        }
    }
}

/// Latest known status snapshot of a backend job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Opaque token issued at submission.
    pub uuid: String,
    pub state: JobState,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Job {
    pub fn new(uuid: impl Into<String>, state: JobState) -> Self {
        Self {
            uuid: uuid.into(),
            state,
            progress: None,
            message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
