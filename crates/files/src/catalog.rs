use std::{cell::RefCell, fs, path::Path};

use chstate_core::{
    BoxError, CatalogColumn, CatalogDictionary, CatalogIndex, CatalogTable, DatabaseAdapter,
};
use serde::Deserialize;
use tracing::debug;

use crate::FilesError;

/// Catalog rows recorded to a file, for introspection without a server.
///
/// The document holds `tables`, `columns`, `data_skipping_indices`, and
/// `dictionaries` arrays whose fields are the `system.*` column names. JSON
/// exports work too since they parse as YAML.
#[derive(Debug, Default)]
pub struct CatalogFile {
    document: CatalogDocument,
    executed_sql: RefCell<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogDocument {
    tables: Vec<CatalogTable>,
    columns: Vec<CatalogColumn>,
    data_skipping_indices: Vec<CatalogIndex>,
    dictionaries: Vec<CatalogDictionary>,
}

impl CatalogFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FilesError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FilesError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&text).map_err(|source| FilesError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            file = %path.display(),
            tables = catalog.document.tables.len(),
            "loaded catalog file"
        );
        Ok(catalog)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let document = if text.trim().is_empty() {
            CatalogDocument::default()
        } else {
            serde_yaml::from_str(text)?
        };
        Ok(Self {
            document,
            executed_sql: RefCell::default(),
        })
    }

    /// Statements passed to [`DatabaseAdapter::execute`]; a recorded
    /// catalog keeps them instead of running them.
    #[must_use]
    pub fn executed_sql(&self) -> Vec<String> {
        self.executed_sql.borrow().clone()
    }
}

impl DatabaseAdapter for CatalogFile {
    fn list_tables(&self) -> Result<Vec<CatalogTable>, BoxError> {
        Ok(self.document.tables.clone())
    }

    fn list_columns(&self, database: &str, table: &str) -> Result<Vec<CatalogColumn>, BoxError> {
        Ok(self
            .document
            .columns
            .iter()
            .filter(|column| column.database == database && column.table == table)
            .cloned()
            .collect())
    }

    fn list_data_skipping_indices(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<CatalogIndex>, BoxError> {
        Ok(self
            .document
            .data_skipping_indices
            .iter()
            .filter(|index| index.database == database && index.table == table)
            .cloned()
            .collect())
    }

    fn list_dictionaries(&self) -> Result<Vec<CatalogDictionary>, BoxError> {
        Ok(self.document.dictionaries.clone())
    }

    fn execute(&self, sql: &str) -> Result<(), BoxError> {
        self.executed_sql.borrow_mut().push(sql.to_string());
        Ok(())
    }
}
