#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tempfile::TempDir;

/// A temporary schema directory and catalog file for driving the binary.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir =
            tempfile::tempdir().unwrap_or_else(|error| panic!("failed to create tempdir: {error}"));
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|error| panic!("failed to create {}: {error}", parent.display()));
        }
        fs::write(&path, contents)
            .unwrap_or_else(|error| panic!("failed to write {}: {error}", path.display()));
        path
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_chstate"))
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("CHSTATE_SCHEMA_DIR")
            .env_remove("CHSTATE_CATALOG")
            .env_remove("CHSTATE_DATABASE")
            .env_remove("CHSTATE_LOG_LEVEL")
            .args(args)
            .output()
            .unwrap_or_else(|error| panic!("failed to run chstate: {error}"))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub const EVENTS_TABLE: &str = "
name: events
database: analytics
engine:
  kind: MergeTree
columns:
  - name: id
    type: UInt64
  - name: status
    type: String
orderBy: [id]
";

pub const CATALOG: &str = "
tables:
  - database: analytics
    name: events
    engine: MergeTree
    engine_full: MergeTree ORDER BY id SETTINGS index_granularity = 8192
    sorting_key: id
  - database: analytics
    name: legacy
    engine: Log
    engine_full: Log
  - database: analytics
    name: buffer
    engine: Buffer
    engine_full: Buffer(analytics, events, 16, 10, 100, 10000, 1000000, 10000000, 100000000)
columns:
  - database: analytics
    table: events
    name: id
    type: UInt64
  - database: analytics
    table: legacy
    name: line
    type: String
";
