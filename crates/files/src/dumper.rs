use std::{
    fs,
    path::{Path, PathBuf},
};

use chstate_core::Snapshot;
use serde::Serialize;
use tracing::info;

use crate::{
    FilesError,
    layout::{
        CLUSTERS_DIR, DICTIONARIES_DIR, MATERIALIZED_VIEWS_DIR, TABLES_DIR, VIEWS_DIR,
        YAML_EXTENSION,
    },
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    pub output_dir: PathBuf,
    /// Only entities of this database; entities without a database are kept.
    pub database: Option<String>,
    /// Skip views, materialized views, dictionaries, and clusters.
    pub tables_only: bool,
    /// Replace existing files instead of failing.
    pub overwrite: bool,
}

/// Writes a snapshot as a schema directory that [`crate::SchemaLoader`] reads back.
#[derive(Debug, Clone)]
pub struct Dumper {
    options: DumpOptions,
}

impl Dumper {
    #[must_use]
    pub fn new(options: DumpOptions) -> Self {
        Self { options }
    }

    /// Returns the written files in write order.
    pub fn dump(&self, snapshot: &Snapshot) -> Result<Vec<PathBuf>, FilesError> {
        let mut written = Vec::new();

        for table in snapshot.tables() {
            if self.includes(table.database.as_deref()) {
                written.push(self.write(TABLES_DIR, &table.name, table)?);
            }
        }

        if !self.options.tables_only {
            for view in snapshot.views() {
                if self.includes(view.database.as_deref()) {
                    written.push(self.write(VIEWS_DIR, &view.name, view)?);
                }
            }
            for view in snapshot.materialized_views() {
                if self.includes(view.database.as_deref()) {
                    written.push(self.write(MATERIALIZED_VIEWS_DIR, &view.name, view)?);
                }
            }
            for dictionary in snapshot.dictionaries() {
                if self.includes(dictionary.database.as_deref()) {
                    written.push(self.write(DICTIONARIES_DIR, &dictionary.name, dictionary)?);
                }
            }
            for cluster in snapshot.clusters() {
                written.push(self.write(CLUSTERS_DIR, &cluster.name, cluster)?);
            }
        }

        info!(
            files = written.len(),
            output_dir = %self.options.output_dir.display(),
            "schema dump completed"
        );
        Ok(written)
    }

    fn includes(&self, database: Option<&str>) -> bool {
        match (self.options.database.as_deref(), database) {
            (Some(wanted), Some(database)) => wanted == database,
            _ => true,
        }
    }

    fn write<T: Serialize>(
        &self,
        subdir: &str,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, FilesError> {
        let dir = self.options.output_dir.join(subdir);
        fs::create_dir_all(&dir).map_err(|source| FilesError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(format!("{name}.{YAML_EXTENSION}"));
        if !self.options.overwrite && path.exists() {
            return Err(FilesError::AlreadyExists { path });
        }

        let yaml = serde_yaml::to_string(value).map_err(|source| FilesError::Yaml {
            path: path.clone(),
            source,
        })?;
        write_file(&path, &yaml)?;
        info!(file = %path.display(), "dumped {subdir} entry {name}");
        Ok(path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), FilesError> {
    fs::write(path, contents).map_err(|source| FilesError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
