//! Asynchronous job tracking
//!
//! Drives a backend job from submission to a terminal state by repeated
//! status queries, reporting every non-terminal snapshot to the caller.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;

use crate::api::{ApiError, SuiteApi};
use crate::models::Job;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Terminal outcome of tracking a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The job reached a terminal state and reported success.
    Succeeded,
    /// The job reached a terminal state and reported failure.
    Failed,
    /// Tracking was aborted through the [`CancelToken`] before a terminal
    /// state was observed.
    Cancelled,
}

impl TrackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrackOutcome::Succeeded)
    }
}

/// Handle for aborting an in-flight poll early.
///
/// Clones observe the same cancellation flag; a token that is never
/// cancelled leaves the poll running to its terminal state.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request cancellation of every poll holding a clone of this token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            // The sender half lives inside the token, so `changed` cannot
            // fail while any clone exists.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls a single job to a terminal state.
pub struct JobPoller {
    api: Arc<dyn SuiteApi>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(api: Arc<dyn SuiteApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the interval between status queries.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Track `uuid` until it reaches a terminal state or the token fires.
    ///
    /// Every non-terminal snapshot is handed to `on_progress` before the
    /// next poll is scheduled; polls for one job are strictly sequential.
    /// A transport failure is propagated immediately, without retry.
    pub async fn track<F>(
        &self,
        uuid: &str,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<TrackOutcome, ApiError>
    where
        F: FnMut(&Job),
    {
        debug!("Tracking job {}", uuid);

        loop {
            if cancel.is_cancelled() {
                debug!("Tracking of job {} cancelled", uuid);
                return Ok(TrackOutcome::Cancelled);
            }

            let job = self.api.job_status(uuid).await?;

            if job.state.is_terminal() {
                debug!("Job {} finished: {}", uuid, job.state);
                return Ok(if job.state.is_success() {
                    TrackOutcome::Succeeded
                } else {
                    TrackOutcome::Failed
                });
            }

            on_progress(&job);

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Tracking of job {} cancelled", uuid);
                    return Ok(TrackOutcome::Cancelled);
                }
                _ = sleep(self.interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::models::JobState;

    fn poller(api: Arc<FakeApi>) -> JobPoller {
        JobPoller::new(api).with_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_polls_to_success() {
        let api = Arc::new(FakeApi::default());
        api.push_job_state(Job::new("abc", JobState::Scheduled));
        api.push_job_state(Job::new("abc", JobState::Running));
        api.push_job_state(Job::new("abc", JobState::Success));

        let mut observed = Vec::new();
        let outcome = poller(Arc::clone(&api))
            .track("abc", &CancelToken::new(), |job| observed.push(job.state))
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::Succeeded);
        assert!(outcome.is_success());
        // Terminal snapshot is not reported as progress.
        assert_eq!(observed, vec![JobState::Scheduled, JobState::Running]);
    }

    #[tokio::test]
    async fn test_backend_failure_is_an_outcome() {
        let api = Arc::new(FakeApi::default());
        api.push_job_state(Job::new("abc", JobState::Running));
        api.push_job_state(Job::new("abc", JobState::Error));

        let mut calls = 0;
        let outcome = poller(Arc::clone(&api))
            .track("abc", &CancelToken::new(), |_| calls += 1)
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::Failed);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let api = Arc::new(FakeApi::default());
        api.push_job_state(Job::new("abc", JobState::Running));
        api.push_job_error(ApiError::RequestFailed("connection reset".to_string()));

        let mut calls = 0;
        let error = poller(Arc::clone(&api))
            .track("abc", &CancelToken::new(), |_| calls += 1)
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::RequestFailed(_)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_polling() {
        let api = Arc::new(FakeApi::default());
        api.push_job_state(Job::new("abc", JobState::Running));

        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = poller(Arc::clone(&api))
            .track("abc", &cancel, |_| {})
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::Cancelled);
        // No status query was issued.
        assert_eq!(api.job_states.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_aborts_between_polls() {
        let api = Arc::new(FakeApi::default());
        api.push_job_state(Job::new("abc", JobState::Running));
        api.push_job_state(Job::new("abc", JobState::Running));

        let cancel = CancelToken::new();
        let handle = cancel.clone();

        let outcome = JobPoller::new(Arc::clone(&api) as Arc<dyn SuiteApi>)
            .with_interval(Duration::from_secs(3600))
            .track("abc", &cancel, |_| handle.cancel())
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::Cancelled);
        // The second scripted state was never fetched.
        assert_eq!(api.job_states.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let cancel = CancelToken::new();
        assert!(!cancel.is_cancelled());

        cancel.cancel();
        assert!(cancel.is_cancelled());
        cancel.cancelled().await;
    }
}
