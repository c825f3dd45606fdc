use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chstate_core::{Cluster, Dictionary, MaterializedView, Snapshot, Table, View};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    FilesError,
    layout::{
        CLUSTERS_DIR, DICTIONARIES_DIR, MATERIALIZED_VIEWS_DIR, TABLES_DIR, VIEWS_DIR,
        is_yaml_file,
    },
};

/// Reads a declarative schema directory into a [`Snapshot`].
///
/// Each `*.yaml`/`*.yml` file under a kind's sub-directory holds one entity.
/// Files are read in path order, so the snapshot does not depend on
/// directory listing order. Missing directories contribute nothing.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    root: PathBuf,
}

impl SchemaLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self) -> Result<Snapshot, FilesError> {
        let mut snapshot = Snapshot::new();

        for table in self.load_kind::<Table>(TABLES_DIR)? {
            snapshot.add_table(table)?;
        }
        for view in self.load_kind::<View>(VIEWS_DIR)? {
            snapshot.add_view(view)?;
        }
        for view in self.load_kind::<MaterializedView>(MATERIALIZED_VIEWS_DIR)? {
            snapshot.add_materialized_view(view)?;
        }
        for dictionary in self.load_kind::<Dictionary>(DICTIONARIES_DIR)? {
            snapshot.add_dictionary(dictionary)?;
        }
        for cluster in self.load_kind::<Cluster>(CLUSTERS_DIR)? {
            snapshot.add_cluster(cluster)?;
        }

        Ok(snapshot)
    }

    fn load_kind<T: DeserializeOwned>(&self, subdir: &str) -> Result<Vec<T>, FilesError> {
        yaml_files(&self.root.join(subdir))?
            .iter()
            .map(|path| read_yaml(path))
            .collect()
    }
}

fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, FilesError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(FilesError::ReadDir {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| FilesError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if is_yaml_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, FilesError> {
    let text = fs::read_to_string(path).map_err(|source| FilesError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_yaml::from_str(&text).map_err(|source| FilesError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), "loaded schema file");
    Ok(value)
}
