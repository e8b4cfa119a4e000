//! Console rendering of cached suite state
//!
//! Table, JSON and CSV views for the CLI front-end.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::aggregate::ResultPair;
use crate::models::{Dataset, ModelMeta, TestFunction, TestSuite, TestSuiteExecution};
use crate::store::SuiteState;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Formatter for cached suite state
pub struct SuiteFormatter {
    format: OutputFormat,
}

impl SuiteFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a summary of the cached state
    pub fn format_state(&self, state: &SuiteState) -> String {
        match self.format {
            OutputFormat::Table => format_state_table(state),
            OutputFormat::Json => {
                serde_json::to_string(&StateSummary::from(state)).unwrap_or_default()
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&StateSummary::from(state)).unwrap_or_default()
            }
        }
    }

    /// Format the execution history
    pub fn format_executions(&self, executions: &[TestSuiteExecution]) -> String {
        match self.format {
            OutputFormat::Table => format_executions_table(executions),
            OutputFormat::Json => serde_json::to_string(executions).unwrap_or_default(),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(executions).unwrap_or_default()
            }
        }
    }

    /// Format the aggregated per-test result view
    pub fn format_results(&self, state: &SuiteState) -> String {
        let grouped = state.results_by_test();
        match self.format {
            OutputFormat::Table => format_results_table(&grouped, &state.registry),
            OutputFormat::Json => {
                serde_json::to_string(&result_rows(&grouped, &state.registry)).unwrap_or_default()
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&result_rows(&grouped, &state.registry))
                    .unwrap_or_default()
            }
        }
    }
}

/// One aggregated result, flattened for JSON and CSV output
#[derive(Clone, Debug, Serialize)]
struct ResultRow {
    test_uuid: Uuid,
    test_name: String,
    execution_id: i64,
    execution_date: String,
    passed: bool,
    metric: Option<f64>,
    message: Option<String>,
}

fn function_names(registry: &[TestFunction]) -> HashMap<Uuid, &TestFunction> {
    registry.iter().map(|f| (f.uuid, f)).collect()
}

fn test_name(pair: &ResultPair<'_>, names: &HashMap<Uuid, &TestFunction>) -> String {
    pair.test_result
        .test
        .function_uuid
        .and_then(|uuid| names.get(&uuid))
        .map(|function| function.title().to_string())
        .unwrap_or_else(|| pair.test_result.test.test_uuid.to_string())
}

fn result_rows(
    grouped: &BTreeMap<Uuid, Vec<ResultPair<'_>>>,
    registry: &[TestFunction],
) -> Vec<ResultRow> {
    let names = function_names(registry);
    let mut rows = Vec::new();

    for (test_uuid, pairs) in grouped {
        for pair in pairs {
            rows.push(ResultRow {
                test_uuid: *test_uuid,
                test_name: test_name(pair, &names),
                execution_id: pair.execution.id,
                execution_date: pair.execution.execution_date.to_rfc3339(),
                passed: pair.test_result.passed,
                metric: pair.test_result.metric,
                message: pair.test_result.message.clone(),
            });
        }
    }

    rows
}

/// Write the aggregated per-test rows to a CSV file
pub fn export_results_csv(path: &Path, state: &SuiteState) -> Result<()> {
    let grouped = state.results_by_test();
    let rows = result_rows(&grouped, &state.registry);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record([
        "test_uuid",
        "test_name",
        "execution_id",
        "execution_date",
        "passed",
        "metric",
        "message",
    ])?;

    for row in &rows {
        writer.write_record([
            row.test_uuid.to_string(),
            row.test_name.clone(),
            row.execution_id.to_string(),
            row.execution_date.clone(),
            row.passed.to_string(),
            row.metric.map(|m| m.to_string()).unwrap_or_default(),
            row.message.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    info!("Exported {} result rows to {}", rows.len(), path.display());
    Ok(())
}

fn format_state_table(state: &SuiteState) -> String {
    let mut output = String::new();

    match &state.suite {
        Some(suite) => {
            output.push_str(&format!(
                "Suite: {} (id {}, project {})\n",
                suite.name, suite.id, suite.project_id
            ));
        }
        None => {
            output.push_str("No suite loaded\n");
            return output;
        }
    }

    if !state.inputs.is_empty() {
        output.push_str("Inputs:\n");
        let mut inputs: Vec<_> = state.inputs.iter().collect();
        inputs.sort();
        for (name, input_type) in inputs {
            output.push_str(&format!("  {name}: {input_type}\n"));
        }
    }

    let tests = state.suite.as_ref().map(|s| s.tests.len()).unwrap_or(0);
    output.push_str(&format!(
        "Tests: {} | Registry: {} functions\n",
        tests,
        state.registry.len()
    ));
    output.push_str(&format!(
        "Datasets: {} | Models: {}\n",
        state.datasets.len(),
        state.models.len()
    ));
    output.push_str(&format!("Executions: {}\n", state.executions.len()));

    if !state.tracked_jobs.is_empty() {
        output.push_str(&format!("In-flight jobs: {}\n", state.tracked_jobs.len()));
    }

    output
}

fn format_executions_table(executions: &[TestSuiteExecution]) -> String {
    let mut output = String::new();

    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    for execution in executions {
        let status = execution
            .result
            .map(|r| format!("{} {}", r.symbol(), r))
            .unwrap_or_else(|| "· PENDING".to_string());
        output.push_str(&format!(
            "  #{:<5} {}  {:10} {} results\n",
            execution.id,
            execution.execution_date.format("%Y-%m-%d %H:%M:%S"),
            status,
            execution.result_entries().len()
        ));
    }
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    output.push_str(&format!("Total: {} executions\n", executions.len()));

    output
}

fn format_results_table(
    grouped: &BTreeMap<Uuid, Vec<ResultPair<'_>>>,
    registry: &[TestFunction],
) -> String {
    let names = function_names(registry);
    let mut output = String::new();

    if grouped.is_empty() {
        output.push_str("No results\n");
        return output;
    }

    for (test_uuid, pairs) in grouped {
        let passed = pairs.iter().filter(|p| p.test_result.passed).count();
        let name = pairs
            .first()
            .map(|pair| test_name(pair, &names))
            .unwrap_or_else(|| test_uuid.to_string());

        output.push_str(&format!(
            "{} ({}/{} passed)\n",
            name,
            passed,
            pairs.len()
        ));

        for pair in pairs {
            let symbol = if pair.test_result.passed { "✓" } else { "✗" };
            let metric = pair
                .test_result
                .metric
                .map(|m| format!(" metric={m:.4}"))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} run #{} at {}{}\n",
                symbol,
                pair.execution.id,
                pair.execution.execution_date.format("%Y-%m-%d %H:%M:%S"),
                metric
            ));
        }
    }

    output
}

/// JSON-serializable state summary
#[derive(Serialize)]
struct StateSummary<'a> {
    project_id: Option<i64>,
    suite: Option<&'a TestSuite>,
    inputs: &'a HashMap<String, String>,
    registry: &'a [TestFunction],
    datasets: Vec<&'a Dataset>,
    models: Vec<&'a ModelMeta>,
    executions: &'a [TestSuiteExecution],
}

impl<'a> From<&'a SuiteState> for StateSummary<'a> {
    fn from(state: &'a SuiteState) -> Self {
        let mut datasets: Vec<_> = state.datasets.values().collect();
        datasets.sort_by_key(|d| d.id);
        let mut models: Vec<_> = state.models.values().collect();
        models.sort_by_key(|m| m.id);

        Self {
            project_id: state.project_id,
            suite: state.suite.as_ref(),
            inputs: &state.inputs,
            registry: &state.registry,
            datasets,
            models,
            executions: &state.executions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionStatus, SuiteTestResult, TestRef};
    use chrono::{TimeZone, Utc};

    fn state_with_results() -> (SuiteState, Uuid) {
        let function_uuid = Uuid::new_v4();
        let test_uuid = Uuid::new_v4();

        let state = SuiteState {
            project_id: Some(7),
            suite: Some(TestSuite {
                id: 42,
                project_id: 7,
                name: "regression".to_string(),
                test_inputs: Vec::new(),
                tests: Vec::new(),
            }),
            registry: vec![TestFunction {
                uuid: function_uuid,
                name: "test_accuracy".to_string(),
                display_name: Some("Accuracy".to_string()),
                module: None,
                doc: None,
                args: Vec::new(),
            }],
            executions: vec![TestSuiteExecution {
                id: 1,
                suite_id: 42,
                execution_date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                inputs: HashMap::new(),
                result: Some(ExecutionStatus::Passed),
                results: Some(vec![SuiteTestResult {
                    test: TestRef {
                        test_uuid,
                        function_uuid: Some(function_uuid),
                    },
                    passed: true,
                    metric: Some(0.93),
                    message: None,
                }]),
            }],
            ..SuiteState::default()
        };

        (state, test_uuid)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert!(OutputFormat::from_str("unknown").is_none());
    }

    #[test]
    fn test_state_table_without_suite() {
        let formatter = SuiteFormatter::new(OutputFormat::Table);
        let output = formatter.format_state(&SuiteState::default());
        assert!(output.contains("No suite loaded"));
    }

    #[test]
    fn test_results_table_resolves_names() {
        let (state, _) = state_with_results();
        let formatter = SuiteFormatter::new(OutputFormat::Table);

        let output = formatter.format_results(&state);
        assert!(output.contains("Accuracy (1/1 passed)"));
        assert!(output.contains("run #1"));
    }

    #[test]
    fn test_results_json_rows() {
        let (state, test_uuid) = state_with_results();
        let formatter = SuiteFormatter::new(OutputFormat::Json);

        let output = formatter.format_results(&state);
        let rows: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(rows[0]["test_uuid"], test_uuid.to_string());
        assert_eq!(rows[0]["test_name"], "Accuracy");
        assert_eq!(rows[0]["passed"], true);
    }

    #[test]
    fn test_csv_export() {
        let (state, test_uuid) = state_with_results();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        export_results_csv(&path, &state).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("test_uuid,test_name"));
        assert!(content.contains(&test_uuid.to_string()));
        assert!(content.contains("Accuracy"));
        assert!(content.contains("true"));
    }
}
