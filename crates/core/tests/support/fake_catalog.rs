use std::{cell::RefCell, error::Error as StdError, fmt};

use chstate_core::{
    BoxError, CatalogColumn, CatalogDictionary, CatalogIndex, CatalogTable, DatabaseAdapter,
};

#[derive(Debug, Default)]
struct FailureRule {
    sql: String,
    message: String,
}

#[derive(Debug, Default)]
pub struct FakeCatalog {
    state: RefCell<FakeCatalogState>,
}

#[derive(Debug, Default)]
struct FakeCatalogState {
    tables: Vec<CatalogTable>,
    columns: Vec<CatalogColumn>,
    indices: Vec<CatalogIndex>,
    dictionaries: Vec<CatalogDictionary>,
    executed_sql: Vec<String>,
    column_queries: usize,
    fail_on_sql: Option<FailureRule>,
    fail_list_tables: Option<String>,
}

#[allow(dead_code)]
impl FakeCatalog {
    pub fn add_table(&self, database: &str, name: &str, engine: &str, engine_full: &str) {
        self.state.borrow_mut().tables.push(CatalogTable {
            database: database.to_string(),
            name: name.to_string(),
            engine: engine.to_string(),
            engine_full: engine_full.to_string(),
            ..CatalogTable::default()
        });
    }

    pub fn add_table_row(&self, row: CatalogTable) {
        self.state.borrow_mut().tables.push(row);
    }

    pub fn add_column(&self, database: &str, table: &str, name: &str, data_type: &str) {
        self.add_column_row(CatalogColumn {
            database: database.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            data_type: data_type.to_string(),
            ..CatalogColumn::default()
        });
    }

    pub fn add_column_row(&self, row: CatalogColumn) {
        self.state.borrow_mut().columns.push(row);
    }

    pub fn add_index_row(&self, row: CatalogIndex) {
        self.state.borrow_mut().indices.push(row);
    }

    pub fn add_dictionary_row(&self, row: CatalogDictionary) {
        self.state.borrow_mut().dictionaries.push(row);
    }

    pub fn set_fail_on_sql(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.state.borrow_mut().fail_on_sql = Some(FailureRule {
            sql: sql.into(),
            message: message.into(),
        });
    }

    pub fn set_fail_list_tables(&self, message: impl Into<String>) {
        self.state.borrow_mut().fail_list_tables = Some(message.into());
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.borrow().executed_sql.clone()
    }

    pub fn column_queries(&self) -> usize {
        self.state.borrow().column_queries
    }
}

impl DatabaseAdapter for FakeCatalog {
    fn list_tables(&self) -> Result<Vec<CatalogTable>, BoxError> {
        let state = self.state.borrow();
        if let Some(message) = &state.fail_list_tables {
            return Err(boxed_error(message.clone()));
        }
        Ok(state.tables.clone())
    }

    fn list_columns(&self, database: &str, table: &str) -> Result<Vec<CatalogColumn>, BoxError> {
        let mut state = self.state.borrow_mut();
        state.column_queries += 1;
        Ok(state
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
            .state
            .borrow()
            .indices
            .iter()
            .filter(|index| index.database == database && index.table == table)
            .cloned()
            .collect())
    }

    fn list_dictionaries(&self) -> Result<Vec<CatalogDictionary>, BoxError> {
        Ok(self.state.borrow().dictionaries.clone())
    }

    fn execute(&self, sql: &str) -> Result<(), BoxError> {
        let mut state = self.state.borrow_mut();

        if let Some(rule) = &state.fail_on_sql
            && rule.sql == sql
        {
            return Err(boxed_error(rule.message.clone()));
        }

        state.executed_sql.push(sql.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct FakeSourceError(String);

impl fmt::Display for FakeSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for FakeSourceError {}

fn boxed_error(message: impl Into<String>) -> BoxError {
    Box::new(FakeSourceError(message.into()))
}
