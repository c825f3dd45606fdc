use std::{fs, path::Path};

use chstate_core::{Column, Engine, ObjectKind, SchemaError};
use chstate_files::{FilesError, SchemaLoader};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    fs::write(path, contents).expect("write fixture file");
}

#[test]
fn loads_every_entity_kind() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "tables/events.yaml",
        r"
name: events
database: posthog
engine:
  kind: ReplicatedReplacingMergeTree
  zooPath: /clickhouse/tables/{shard}/events
  replicaName: '{replica}'
  versionColumn: _version
columns:
  - name: id
    type: UUID
  - name: team_id
    type: Int64
    codec: CODEC(DoubleDelta)
    comment: owning team
  - name: _version
    type: UInt64
    defaultExpression: '0'
orderBy: [team_id, id]
partitionBy: toYYYYMM(timestamp)
settings:
  index_granularity: '8192'
indexes:
  - name: idx_team
    expression: team_id
    type: minmax
    granularity: 4
",
    );
    write(
        dir.path(),
        "views/recent.yml",
        "name: recent\nselectQuery: SELECT 1\n",
    );
    write(
        dir.path(),
        "materialized_views/events_mv.yaml",
        "name: events_mv\ndestinationTable: posthog.events_by_team\nselectQuery: SELECT team_id FROM posthog.events\n",
    );
    write(
        dir.path(),
        "dictionaries/teams.yaml",
        "name: teams\nattributes:\n  - name: id\n    type: UInt64\nprimaryKey: [id]\nsource: 'ClickHouse: posthog.teams'\nlayout: Flat\n",
    );
    write(
        dir.path(),
        "clusters/posthog.yaml",
        "name: posthog\nnodes:\n  - host: ch-1\n    port: 9000\n    shard: 1\n    replica: 1\n",
    );

    let snapshot = SchemaLoader::new(dir.path())
        .load()
        .unwrap_or_else(|error| panic!("schema should load: {error}"));

    let events = snapshot
        .find_table("events")
        .unwrap_or_else(|| panic!("events table is loaded"));
    assert_eq!(
        events.engine,
        Engine::ReplicatedReplacingMergeTree {
            zoo_path: "/clickhouse/tables/{shard}/events".to_string(),
            replica_name: "{replica}".to_string(),
            version_column: Some("_version".to_string()),
        }
    );
    assert_eq!(events.order_by, vec!["team_id", "id"]);
    assert_eq!(
        events.find_column("team_id"),
        Some(
            &Column::new("team_id", "Int64")
                .with_codec("CODEC(DoubleDelta)")
                .with_comment("owning team")
        )
    );
    assert_eq!(events.indexes.len(), 1);
    assert!(snapshot.find_view("recent").is_some());
    assert!(snapshot.find_materialized_view("events_mv").is_some());
    assert!(snapshot.find_dictionary("teams").is_some());
    assert!(snapshot.find_cluster("posthog").is_some());
}

#[test]
fn missing_directories_yield_an_empty_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = SchemaLoader::new(dir.path().join("does-not-exist"))
        .load()
        .unwrap_or_else(|error| panic!("missing root is not an error: {error}"));
    assert!(snapshot.is_empty());
}

#[test]
fn non_yaml_files_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "tables/README.md", "# not a table");
    write(
        dir.path(),
        "tables/log.yaml",
        "name: log\nengine:\n  kind: Log\ncolumns:\n  - name: line\n    type: String\n",
    );

    let snapshot = SchemaLoader::new(dir.path())
        .load()
        .unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(snapshot.tables().len(), 1);
    assert_eq!(snapshot.tables()[0].engine, Engine::Log);
}

#[test]
fn tables_load_in_file_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["c", "a", "b"] {
        write(
            dir.path(),
            &format!("tables/{name}.yaml"),
            &format!("name: {name}\nengine:\n  kind: MergeTree\n"),
        );
    }

    let snapshot = SchemaLoader::new(dir.path())
        .load()
        .unwrap_or_else(|error| panic!("{error}"));
    let names: Vec<&str> = snapshot
        .tables()
        .iter()
        .map(|table| table.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn malformed_yaml_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "tables/broken.yaml", "name: [unterminated\n");

    let error = SchemaLoader::new(dir.path())
        .load()
        .expect_err("broken YAML is rejected");
    match &error {
        FilesError::Yaml { path, .. } => assert!(path.ends_with("tables/broken.yaml")),
        other => panic!("expected YAML error, got {other:?}"),
    }
    assert!(error.to_string().contains("broken.yaml"));
}

#[test]
fn unknown_engine_kind_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "tables/t.yaml",
        "name: t\nengine:\n  kind: Memory\n",
    );

    assert!(matches!(
        SchemaLoader::new(dir.path()).load(),
        Err(FilesError::Yaml { .. })
    ));
}

#[test]
fn duplicate_table_names_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "tables/a.yaml",
        "name: events\nengine:\n  kind: Log\n",
    );
    write(
        dir.path(),
        "tables/b.yml",
        "name: events\nengine:\n  kind: MergeTree\n",
    );

    let error = SchemaLoader::new(dir.path())
        .load()
        .expect_err("duplicate names are rejected");
    assert!(matches!(
        error,
        FilesError::Schema(SchemaError::DuplicateName {
            kind: ObjectKind::Table,
            ..
        })
    ));
}
