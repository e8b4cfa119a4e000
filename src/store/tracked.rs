//! In-flight job registry
//!
//! Maps job uuids to their latest status snapshot. The map is immutable:
//! every update produces a new value, so holders of a previous snapshot can
//! detect change by pointer identity. An entry exists exactly while its job
//! is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Job;

#[derive(Clone, Debug, Default)]
pub struct TrackedJobs {
    jobs: Arc<HashMap<String, Job>>,
}

impl TrackedJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// New registry with `uuid` set to `job` (insert or overwrite).
    #[must_use]
    pub fn with_job(&self, uuid: &str, job: Job) -> Self {
        let mut jobs: HashMap<_, _> = (*self.jobs).clone();
        jobs.insert(uuid.to_string(), job);
        Self {
            jobs: Arc::new(jobs),
        }
    }

    /// New registry without `uuid`.
    #[must_use]
    pub fn without_job(&self, uuid: &str) -> Self {
        let mut jobs: HashMap<_, _> = (*self.jobs).clone();
        jobs.remove(uuid);
        Self {
            jobs: Arc::new(jobs),
        }
    }

    pub fn get(&self, uuid: &str) -> Option<&Job> {
        self.jobs.get(uuid)
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.jobs.contains_key(uuid)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Job)> {
        self.jobs.iter()
    }

    /// Whether two registries share the same underlying map.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.jobs, &other.jobs)
    }
}
