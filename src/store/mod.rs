//! Suite state cache and synchronization actions
//!
//! [`SuiteStore`] mirrors server-side state for the currently loaded suite
//! and drives executions end to end: load, update, schedule, track, reload.
//! It is an explicit context object, owned by the composition root and
//! passed by reference to consumers.

mod tracked;

pub use tracked::TrackedJobs;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::{self, ResultPair};
use crate::api::SuiteApi;
use crate::models::{Dataset, ModelMeta, TestFunction, TestSuite, TestSuiteExecution};
use crate::notify::{Notification, NotificationSink, EXECUTION_FAILED, EXECUTION_SUCCEEDED};
use crate::poller::{CancelToken, JobPoller, TrackOutcome};

/// Cached server-side state for the currently loaded suite.
///
/// Owned exclusively by the store; loading a different suite discards the
/// previous state in full.
#[derive(Clone, Debug, Default)]
pub struct SuiteState {
    pub project_id: Option<i64>,
    /// Available inputs, name to declared type.
    pub inputs: HashMap<String, String>,
    pub suite: Option<TestSuite>,
    /// Test function catalog delivered alongside the suite.
    pub registry: Vec<TestFunction>,
    /// Referenced datasets, indexed by id at load time.
    pub datasets: HashMap<i64, Dataset>,
    /// Referenced models, indexed by id at load time.
    pub models: HashMap<i64, ModelMeta>,
    pub executions: Vec<TestSuiteExecution>,
    /// Jobs currently in flight.
    pub tracked_jobs: TrackedJobs,
}

impl SuiteState {
    /// Identifier of the loaded suite, if any.
    pub fn suite_id(&self) -> Option<i64> {
        self.suite.as_ref().map(|suite| suite.id)
    }

    /// Per-test view over the cached executions, recomputed on every call.
    pub fn results_by_test(&self) -> BTreeMap<Uuid, Vec<ResultPair<'_>>> {
        aggregate::results_by_test(&self.executions)
    }
}

/// Synchronization layer between a UI and the test-execution backend.
pub struct SuiteStore {
    api: Arc<dyn SuiteApi>,
    notifier: Arc<dyn NotificationSink>,
    poller: JobPoller,
    state: RwLock<SuiteState>,
}

impl SuiteStore {
    pub fn new(api: Arc<dyn SuiteApi>, notifier: Arc<dyn NotificationSink>) -> Self {
        let poller = JobPoller::new(Arc::clone(&api));
        Self {
            api,
            notifier,
            poller,
            state: RwLock::new(SuiteState::default()),
        }
    }

    /// Set the interval between job status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    /// Read access to the cached state.
    ///
    /// The guard must be dropped before awaiting any store action.
    pub fn state(&self) -> RwLockReadGuard<'_, SuiteState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SuiteState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identifier of the loaded suite, if any.
    pub fn suite_id(&self) -> Option<i64> {
        self.state().suite_id()
    }

    pub fn project_id(&self) -> Option<i64> {
        self.state().project_id
    }

    /// Snapshot of the in-flight job registry (cheap: shares the map).
    pub fn tracked_jobs(&self) -> TrackedJobs {
        self.state().tracked_jobs.clone()
    }

    /// Fetch the composite suite snapshot and replace the cached state.
    ///
    /// Everything the previous suite owned is replaced in one step under
    /// the write lock; datasets and models are re-indexed by id for O(1)
    /// lookup. Jobs still in flight keep their registry entries.
    pub async fn load_test_suite(&self, project_id: i64, suite_id: i64) -> Result<()> {
        debug!("Loading suite {} of project {}", suite_id, project_id);

        let complete = self
            .api
            .suite_complete(project_id, suite_id)
            .await
            .with_context(|| {
                format!("Failed to load suite {suite_id} of project {project_id}")
            })?;

        let datasets: HashMap<i64, Dataset> = complete
            .datasets
            .into_iter()
            .map(|dataset| (dataset.id, dataset))
            .collect();
        let models: HashMap<i64, ModelMeta> = complete
            .models
            .into_iter()
            .map(|model| (model.id, model))
            .collect();

        let mut state = self.write();
        state.project_id = Some(project_id);
        state.inputs = complete.inputs;
        state.suite = Some(complete.suite);
        state.registry = complete.registry;
        state.datasets = datasets;
        state.models = models;
        state.executions = complete.executions;
        Ok(())
    }

    /// Refresh the currently loaded suite; no-op when nothing is loaded.
    pub async fn reload(&self) -> Result<()> {
        let ids = {
            let state = self.state();
            state.project_id.zip(state.suite_id())
        };

        match ids {
            Some((project_id, suite_id)) => self.load_test_suite(project_id, suite_id).await,
            None => Ok(()),
        }
    }

    /// Push a full suite replacement to the backend.
    ///
    /// Only the cached suite is patched with the server's authoritative
    /// response; inputs, registry, datasets, models and executions are left
    /// untouched.
    pub async fn update_test_suite(
        &self,
        project_key: &str,
        suite: &TestSuite,
    ) -> Result<TestSuite> {
        let updated = self
            .api
            .update_suite(project_key, suite)
            .await
            .with_context(|| {
                format!("Failed to update suite {} in project {project_key}", suite.id)
            })?;

        self.write().suite = Some(updated.clone());
        Ok(updated)
    }

    /// Schedule an execution of the loaded suite; returns the job uuid.
    pub async fn schedule_execution(&self, inputs: &HashMap<String, String>) -> Result<String> {
        let (project_id, suite_id) = {
            let state = self.state();
            state.project_id.zip(state.suite_id())
        }
        .context("No suite loaded")?;

        let uuid = self
            .api
            .schedule_execution(project_id, suite_id, inputs)
            .await
            .with_context(|| format!("Failed to schedule execution of suite {suite_id}"))?;

        info!("Scheduled execution of suite {} as job {}", suite_id, uuid);
        Ok(uuid)
    }

    /// Track a job to completion.
    ///
    /// Keeps the registry current while the job is in flight, emits exactly
    /// one success or failure notification, then reloads the suite. A failed
    /// job - including a transport failure mid-poll - is absorbed into the
    /// failure notification; only a reload failure propagates.
    pub async fn track_job(&self, uuid: &str) -> Result<()> {
        self.track_job_with(uuid, &CancelToken::new()).await
    }

    /// [`track_job`](Self::track_job) with an external cancellation handle.
    ///
    /// A cancelled track drops the registry entry without notifying or
    /// reloading: cancellation is a caller-initiated abort, not a job
    /// outcome.
    pub async fn track_job_with(&self, uuid: &str, cancel: &CancelToken) -> Result<()> {
        let outcome = self
            .poller
            .track(uuid, cancel, |job| {
                let mut state = self.write();
                let next = state.tracked_jobs.with_job(uuid, job.clone());
                state.tracked_jobs = next;
            })
            .await;

        {
            let mut state = self.write();
            let next = state.tracked_jobs.without_job(uuid);
            state.tracked_jobs = next;
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("Polling job {} failed: {}", uuid, error);
                TrackOutcome::Failed
            }
        };

        match outcome {
            TrackOutcome::Cancelled => return Ok(()),
            TrackOutcome::Succeeded => self
                .notifier
                .push(Notification::success(EXECUTION_SUCCEEDED)),
            TrackOutcome::Failed => self.notifier.push(Notification::error(EXECUTION_FAILED)),
        }

        self.reload().await
    }

    /// Schedule an execution and track it to completion.
    pub async fn run_suite(&self, inputs: &HashMap<String, String>) -> Result<String> {
        let uuid = self.schedule_execution(inputs).await?;
        self.track_job(&uuid).await?;
        Ok(uuid)
    }
}
