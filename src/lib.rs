//! suite-sync - client-side synchronization layer for a test-execution backend
//!
//! Mirrors server-side state for a test suite (a named collection of
//! parameterized test functions), submits execution requests, polls
//! long-running asynchronous jobs to completion and reshapes raw execution
//! results into a per-test view ready for rendering.
//!
//! ## Building blocks
//!
//! - [`store::SuiteStore`] - the context object a UI holds: cached suite
//!   state, load/reload/update actions and job tracking
//! - [`poller::JobPoller`] - drives a single backend job to a terminal
//!   state, with progress callbacks and cancellation
//! - [`aggregate::results_by_test`] - groups execution results by logical
//!   test identity across runs
//! - [`api::ApiClient`] - typed REST client for the backend service
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use suite_sync::api::ApiClient;
//! use suite_sync::notify::LogSink;
//! use suite_sync::store::SuiteStore;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = ApiClient::new("http://localhost:9000")?;
//! let store = SuiteStore::new(Arc::new(client), Arc::new(LogSink));
//!
//! store.load_test_suite(7, 42).await?;
//! println!("{} executions cached", store.state().executions.len());
//!
//! let uuid = store.schedule_execution(&Default::default()).await?;
//! store.track_job(&uuid).await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod notify;
pub mod output;
pub mod poller;
pub mod store;
