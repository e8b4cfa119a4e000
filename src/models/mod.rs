//! Data models for the synchronization layer
//!
//! Wire shapes consumed from and sent to the test-execution backend.

mod execution;
mod job;
mod suite;

pub use execution::{ExecutionStatus, SuiteTestResult, TestRef, TestSuiteExecution};
pub use job::{Job, JobState};
pub use suite::{
    Dataset, FunctionArgument, ModelMeta, SuiteComplete, SuiteInput, SuiteTest, TestFunction,
    TestSuite,
};
