//! Suite, catalog and referenced-entity models
//!
//! Wire shapes consumed from the backend's composite suite endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::execution::TestSuiteExecution;

/// A named collection of test invocations with declared input placeholders.
///
/// Loaded wholesale, replaced wholesale, never partially mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub test_inputs: Vec<SuiteInput>,
    #[serde(default)]
    pub tests: Vec<SuiteTest>,
}

/// Declared input placeholder on a suite (name plus declared type).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteInput {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
}

/// One test invocation inside a suite.
///
/// A test function may be invoked several times with different bindings;
/// each invocation carries its own stable `test_uuid`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteTest {
    pub test_uuid: Uuid,
    pub function_uuid: Uuid,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

/// Catalog entry describing a callable test function.
///
/// Read-only from this layer's perspective; delivered alongside the suite
/// as a registry snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFunction {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub args: Vec<FunctionArgument>,
}

impl TestFunction {
    /// Human-facing name, falling back to the raw function name.
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Parameter declared by a test function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// Dataset referenced by suite inputs, addressed by integer id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// Model referenced by suite inputs, addressed by integer id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMeta {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub model_type: Option<String>,
}

/// Composite snapshot returned by the suite-complete endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteComplete {
    pub suite: TestSuite,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
    #[serde(default)]
    pub registry: Vec<TestFunction>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default)]
    pub models: Vec<ModelMeta>,
    #[serde(default)]
    pub executions: Vec<TestSuiteExecution>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_title_fallback() {
        let mut function = TestFunction {
            uuid: Uuid::new_v4(),
            name: "test_accuracy".to_string(),
            display_name: None,
            module: None,
            doc: None,
            args: Vec::new(),
        };
        assert_eq!(function.title(), "test_accuracy");

        function.display_name = Some("Accuracy".to_string());
        assert_eq!(function.title(), "Accuracy");
    }

    #[test]
    fn test_suite_wire_names() {
        let json = r#"{
            "id": 42,
            "projectId": 7,
            "name": "regression",
            "testInputs": [{"name": "dataset", "type": "Dataset"}],
            "tests": []
        }"#;

        let suite: TestSuite = serde_json::from_str(json).unwrap();
        assert_eq!(suite.id, 42);
        assert_eq!(suite.project_id, 7);
        assert_eq!(suite.test_inputs[0].input_type, "Dataset");
    }

    #[test]
    fn test_suite_complete_defaults() {
        let json = r#"{"suite": {"id": 1, "projectId": 2, "name": "s"}}"#;
        let complete: SuiteComplete = serde_json::from_str(json).unwrap();
        assert!(complete.registry.is_empty());
        assert!(complete.datasets.is_empty());
        assert!(complete.executions.is_empty());
    }
}
