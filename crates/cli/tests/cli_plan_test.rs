#[path = "support/workspace.rs"]
mod workspace;

use std::fs;

use workspace::{CATALOG, EVENTS_TABLE, Workspace, stderr, stdout};

const EXPECTED_PLAN: &str = "\
--- Execution Plan ---
1. [CREATE_TABLE] Table sessions is defined in schema but does not exist in the database.
2. [DROP_TABLE] Table legacy exists in the database but is not defined in the schema.
3. [ADD_COLUMN] Column events.status is defined in schema but does not exist in the table.
----------------------
";

fn seeded_workspace() -> Workspace {
    let workspace = Workspace::new();
    workspace.write("schema/tables/events.yaml", EVENTS_TABLE);
    workspace.write(
        "schema/tables/sessions.yml",
        "name: sessions\nengine:\n  kind: Log\ncolumns:\n  - name: id\n    type: UUID\n",
    );
    workspace.write("catalog.yaml", CATALOG);
    workspace
}

#[test]
fn plan_prints_actions_in_order() {
    let workspace = seeded_workspace();
    let output = workspace.run(&[
        "plan",
        "--catalog",
        "catalog.yaml",
        "--database",
        "analytics",
    ]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), EXPECTED_PLAN);
}

#[test]
fn plan_with_sql_appends_the_script() {
    let workspace = seeded_workspace();
    let output = workspace.run(&[
        "plan",
        "--catalog",
        "catalog.yaml",
        "--database",
        "analytics",
        "--sql",
    ]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let expected = format!(
        "{EXPECTED_PLAN}\n\
CREATE TABLE analytics.sessions (\n  `id` UUID\n) ENGINE = Log();\n\
DROP TABLE analytics.legacy;\n\
ALTER TABLE analytics.events ADD COLUMN status String;\n"
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn plan_output_goes_to_a_file() {
    let workspace = seeded_workspace();
    let output = workspace.run(&[
        "-c",
        "schema",
        "plan",
        "--catalog",
        "catalog.yaml",
        "--database",
        "analytics",
        "--output",
        "plan.txt",
    ]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let written = fs::read_to_string(workspace.path().join("plan.txt"))
        .unwrap_or_else(|error| panic!("plan file should exist: {error}"));
    assert_eq!(written, EXPECTED_PLAN);
}

#[test]
fn sql_command_renders_every_desired_table() {
    let workspace = seeded_workspace();
    let output = workspace.run(&["sql"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "CREATE TABLE analytics.events (\n  `id` UInt64,\n  `status` String\n) ENGINE = MergeTree()\nORDER BY id;\n\
CREATE TABLE default.sessions (\n  `id` UUID\n) ENGINE = Log();\n"
    );
}

#[test]
fn logs_stay_off_stdout() {
    let workspace = seeded_workspace();
    let output = workspace.run(&[
        "--log-level",
        "debug",
        "--no-color",
        "plan",
        "--catalog",
        "catalog.yaml",
        "--database",
        "analytics",
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), EXPECTED_PLAN);
    let logs = stderr(&output);
    assert!(logs.contains("plan computed"), "{logs}");
}

#[test]
fn plan_apply_runs_every_statement_through_the_catalog() {
    let workspace = seeded_workspace();
    let output = workspace.run(&[
        "plan",
        "--catalog",
        "catalog.yaml",
        "--database",
        "analytics",
        "--apply",
    ]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let expected = format!(
        "{EXPECTED_PLAN}\n\
Applied 3 statement(s).\n\
CREATE TABLE analytics.sessions (\n  `id` UUID\n) ENGINE = Log();\n\
DROP TABLE analytics.legacy;\n\
ALTER TABLE analytics.events ADD COLUMN status String;\n"
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn plan_apply_with_nothing_to_change_executes_nothing() {
    let workspace = Workspace::new();
    workspace.write("schema/tables/legacy.yaml", LEGACY_TABLE);
    workspace.write("catalog.yaml", LEGACY_CATALOG);

    let output = workspace.run(&["plan", "--catalog", "catalog.yaml", "--apply"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "--- Execution Plan ---\n\
No changes detected. The schema is up-to-date.\n\
\n\
Applied 0 statement(s).\n"
    );
}

const LEGACY_TABLE: &str = "
name: legacy
database: analytics
engine:
  kind: Log
columns:
  - name: line
    type: String
";

const LEGACY_CATALOG: &str = "
tables:
  - database: analytics
    name: legacy
    engine: Log
    engine_full: Log
columns:
  - database: analytics
    table: legacy
    name: line
    type: String
";
