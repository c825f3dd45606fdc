use chstate_core::{Column, Engine, Table};

mod yaml_runner;

pub use yaml_runner::{
    RunnerError, TestCase, TestCaseFile, TestResult, load_test_cases_from_dir,
    load_test_cases_from_path, load_test_cases_from_str, run_offline_test,
};

/// `default.<name>` MergeTree table with one `id UInt64` column ordered by `id`.
pub fn single_table_fixture(name: &str) -> Table {
    Table::new(name, Engine::MergeTree)
        .with_database("default")
        .with_column(Column::new("id", "UInt64"))
        .with_order_by(["id"])
}
