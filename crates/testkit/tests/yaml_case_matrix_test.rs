use std::path::PathBuf;

use chstate_testkit::{TestResult, load_test_cases_from_dir, run_offline_test};

const GROUPS: [&str; 3] = ["tables", "columns", "engines"];

#[test]
fn yaml_cases_pass_offline() {
    let mut executed = 0;
    let mut failures = Vec::new();

    for group in GROUPS {
        let files = load_test_cases_from_dir(cases_root().join(group)).unwrap_or_else(|error| {
            panic!("failed to load cases for group '{group}': {error}")
        });
        assert!(!files.is_empty(), "group '{group}' has no case files");

        for file in files {
            for (name, case) in &file.cases {
                match run_offline_test(case) {
                    TestResult::Passed => executed += 1,
                    TestResult::Skipped(reason) => {
                        panic!("{group}/{}::{name} is skipped: {reason}", file.file_name)
                    }
                    TestResult::Failed(reason) => {
                        failures.push(format!("{group}/{}::{name}: {reason}", file.file_name));
                    }
                }
            }
        }
    }

    let report = failures.join("\n\n");
    assert!(failures.is_empty(), "failing cases:\n{report}");
    assert!(executed >= 15, "expected at least 15 cases, ran {executed}");
}

fn cases_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/clickhouse")
}
