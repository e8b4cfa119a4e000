//! Per-test aggregation of execution results
//!
//! Reshapes raw execution history into a per-logical-test view, so the
//! rendering layer never re-derives the grouping itself.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{SuiteTestResult, TestSuiteExecution};

/// One observed result together with the execution that produced it.
#[derive(Clone, Copy, Debug)]
pub struct ResultPair<'a> {
    pub test_result: &'a SuiteTestResult,
    pub execution: &'a TestSuiteExecution,
}

/// Group every known result by the logical test that produced it.
///
/// Flattens each execution's result list into (result, execution) pairs and
/// groups them by `test_uuid`. Grouping is stable: pairs keep the relative
/// order of `executions`, then the order of each execution's result list.
/// Executions without a result list contribute nothing. Recomputed from
/// scratch on every call; inputs are never mutated.
pub fn results_by_test(
    executions: &[TestSuiteExecution],
) -> BTreeMap<Uuid, Vec<ResultPair<'_>>> {
    let mut grouped: BTreeMap<Uuid, Vec<ResultPair<'_>>> = BTreeMap::new();

    for execution in executions {
        for test_result in execution.result_entries() {
            grouped
                .entry(test_result.test.test_uuid)
                .or_default()
                .push(ResultPair {
                    test_result,
                    execution,
                });
        }
    }

    grouped
}
