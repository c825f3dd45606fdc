use serde::{Deserialize, Serialize};

use crate::BoxError;

/// Access to a live (or recorded) server catalog.
///
/// Rows mirror the `system.*` tables they come from; the core converts them
/// into the schema model. Implementations report failures as boxed errors
/// and the core wraps them into `CatalogError` or `ExecutionError`.
pub trait DatabaseAdapter {
    /// Rows of `system.tables`, every database included.
    fn list_tables(&self) -> Result<Vec<CatalogTable>, BoxError>;

    /// Rows of `system.columns` for one table, in column position order.
    fn list_columns(&self, database: &str, table: &str) -> Result<Vec<CatalogColumn>, BoxError>;

    /// Rows of `system.data_skipping_indices` for one table.
    fn list_data_skipping_indices(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<CatalogIndex>, BoxError>;

    /// Rows of `system.dictionaries`.
    fn list_dictionaries(&self) -> Result<Vec<CatalogDictionary>, BoxError> {
        Ok(Vec::new())
    }

    fn execute(&self, sql: &str) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogTable {
    pub database: String,
    pub name: String,
    pub engine: String,
    pub engine_full: String,
    pub sorting_key: String,
    pub partition_key: String,
    pub as_select: String,
    pub create_table_query: String,
}

/// Empty strings stand for "not set", as the server reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumn {
    pub database: String,
    pub table: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub default_expression: String,
    pub compression_codec: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogIndex {
    pub database: String,
    pub table: String,
    pub name: String,
    pub expr: String,
    #[serde(rename = "type_full")]
    pub index_type: String,
    pub granularity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDictionary {
    pub database: String,
    pub name: String,
    #[serde(rename = "key.names")]
    pub key_names: Vec<String>,
    #[serde(rename = "key.types")]
    pub key_types: Vec<String>,
    #[serde(rename = "attribute.names")]
    pub attribute_names: Vec<String>,
    #[serde(rename = "attribute.types")]
    pub attribute_types: Vec<String>,
    pub source: String,
    #[serde(rename = "type")]
    pub layout: String,
    pub lifetime_min: u64,
    pub lifetime_max: u64,
}
