//! Execution records and per-test results
//!
//! One execution record per suite run, each carrying zero or more results
//! keyed by the logical test that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Suite-level verdict of one execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    Error,
}

impl ExecutionStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ExecutionStatus::Passed => "✓",
            ExecutionStatus::Failed => "✗",
            ExecutionStatus::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Passed)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Passed => write!(f, "PASSED"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
            ExecutionStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// One run of a suite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteExecution {
    pub id: i64,
    pub suite_id: i64,
    pub execution_date: DateTime<Utc>,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
    #[serde(default)]
    pub result: Option<ExecutionStatus>,
    /// Absent until the backend has produced per-test results.
    #[serde(default)]
    pub results: Option<Vec<SuiteTestResult>>,
}

impl TestSuiteExecution {
    /// Per-test results, treating an absent list as empty.
    pub fn result_entries(&self) -> &[SuiteTestResult] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// Outcome of one logical test within one execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteTestResult {
    pub test: TestRef,
    pub passed: bool,
    #[serde(default)]
    pub metric: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reference from a result back to its logical test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRef {
    pub test_uuid: Uuid,
    #[serde(default)]
    pub function_uuid: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_status() {
        assert!(ExecutionStatus::Passed.is_success());
        assert!(!ExecutionStatus::Failed.is_success());
        assert_eq!(ExecutionStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_result_entries_absent_list() {
        let json = r#"{
            "id": 1,
            "suiteId": 42,
            "executionDate": "2024-03-01T10:00:00Z"
        }"#;

        let execution: TestSuiteExecution = serde_json::from_str(json).unwrap();
        assert!(execution.results.is_none());
        assert!(execution.result_entries().is_empty());
    }

    #[test]
    fn test_result_wire_names() {
        let json = r#"{
            "test": {"testUuid": "b0fb4a9e-8c43-4c8e-8b9e-000000000001"},
            "passed": true,
            "metric": 0.93
        }"#;

        let result: SuiteTestResult = serde_json::from_str(json).unwrap();
        assert!(result.passed);
        assert_eq!(result.metric, Some(0.93));
        assert!(result.test.function_uuid.is_none());
    }
}
