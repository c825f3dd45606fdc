use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chstate_core::{Plan, Renderer, Snapshot, generate_sql, plan_diff};
use serde::Deserialize;
use thiserror::Error;

/// One YAML case: two snapshot documents and the expected outcome of
/// diffing them in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestCase {
    /// Snapshot document describing the live schema; empty means no objects.
    pub current: String,
    /// Snapshot document describing the schema files.
    pub desired: String,
    /// Expected SQL script for `current -> desired`.
    pub up: Option<String>,
    /// Expected SQL script for `desired -> current`.
    pub down: Option<String>,
    /// Expected rendered plan for `current -> desired`.
    pub plan: Option<String>,
    /// Expected error message; the case passes only when running fails with it.
    pub error: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TestCaseFile {
    pub path: PathBuf,
    pub file_name: String,
    pub cases: BTreeMap<String, TestCase>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid testcase yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid testcase yaml in {}: {source}", .path.display())]
    YamlFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {side} snapshot: {source}")]
    Snapshot {
        side: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Core(#[from] chstate_core::Error),
    #[error("{0}")]
    Assertion(String),
}

pub fn load_test_cases_from_str(yaml: &str) -> Result<BTreeMap<String, TestCase>, RunnerError> {
    Ok(serde_yaml::from_str(yaml)?)
}

pub fn load_test_cases_from_path(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, TestCase>, RunnerError> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|source| RunnerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&yaml).map_err(|source| RunnerError::YamlFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every `.yml`/`.yaml` file directly under `dir`, sorted by file name.
pub fn load_test_cases_from_dir(dir: impl AsRef<Path>) -> Result<Vec<TestCaseFile>, RunnerError> {
    let dir = dir.as_ref();
    let read_error = |source| RunnerError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_yaml = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| matches!(extension, "yml" | "yaml"));
        if path.is_file() && is_yaml {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let cases = load_test_cases_from_path(&path)?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(TestCaseFile {
                path,
                file_name,
                cases,
            })
        })
        .collect()
}

/// Diffs the two snapshots of `test` in both directions without a server
/// and checks the generated SQL and plan against the expectations.
pub fn run_offline_test(test: &TestCase) -> TestResult {
    if let Some(reason) = &test.skip {
        return TestResult::Skipped(reason.clone());
    }

    match evaluate_expected_error(test, run_offline_test_flow(test)) {
        Ok(()) => TestResult::Passed,
        Err(error) => TestResult::Failed(error.to_string()),
    }
}

fn run_offline_test_flow(test: &TestCase) -> Result<(), RunnerError> {
    validate_direction_expectations(test)?;

    let current = parse_snapshot("current", &test.current)?;
    let desired = parse_snapshot("desired", &test.desired)?;

    let forward = plan_diff(&desired, &current);
    assert_expected_plan(test.plan.as_deref(), &forward)?;
    assert_expected_sql("up", test.up.as_deref(), &forward)?;

    let reverse = plan_diff(&current, &desired);
    assert_expected_sql("down", test.down.as_deref(), &reverse)?;

    Ok(())
}

fn parse_snapshot(side: &'static str, yaml: &str) -> Result<Snapshot, RunnerError> {
    if yaml.trim().is_empty() {
        return Ok(Snapshot::new());
    }
    serde_yaml::from_str(yaml).map_err(|source| RunnerError::Snapshot { side, source })
}

fn evaluate_expected_error(
    test: &TestCase,
    execution_result: Result<(), RunnerError>,
) -> Result<(), RunnerError> {
    let Some(expected_error) = test.error.as_deref() else {
        return execution_result;
    };

    match execution_result {
        Ok(()) => Err(RunnerError::Assertion(format!(
            "expected error: {expected_error}, but got no error"
        ))),
        Err(actual_error) => {
            let actual_error = actual_error.to_string();
            if actual_error.trim() == expected_error.trim() {
                Ok(())
            } else {
                Err(RunnerError::Assertion(format!(
                    "expected error: {expected_error}, but got: {actual_error}"
                )))
            }
        }
    }
}

fn validate_direction_expectations(test: &TestCase) -> Result<(), RunnerError> {
    match (&test.up, &test.down) {
        (Some(_), Some(_)) | (None, None) => Ok(()),
        _ => Err(RunnerError::Assertion(
            "`up` and `down` must either both be set or both be omitted".to_string(),
        )),
    }
}

fn assert_expected_plan(expected: Option<&str>, plan: &Plan) -> Result<(), RunnerError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = Renderer::new().render_plan(plan);
    if normalize_sql(expected) == normalize_sql(&actual) {
        return Ok(());
    }

    Err(RunnerError::Assertion(format!(
        "plan mismatch; expected:\n{expected}\nactual:\n{}",
        actual.trim()
    )))
}

fn assert_expected_sql(
    direction: &str,
    expected: Option<&str>,
    plan: &Plan,
) -> Result<(), RunnerError> {
    // Rendered even without an expectation.
    let statements = generate_sql(plan).map_err(chstate_core::Error::from)?;
    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = Renderer::new().render_sql(&statements);
    if normalize_sql(expected) == normalize_sql(&actual) {
        return Ok(());
    }

    Err(RunnerError::Assertion(format!(
        "{direction} SQL mismatch; expected:\n{expected}\nactual:\n{}",
        actual.trim()
    )))
}

fn normalize_sql(sql: &str) -> &str {
    sql.trim()
}
