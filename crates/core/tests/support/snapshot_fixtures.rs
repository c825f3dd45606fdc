use chstate_core::{Column, Engine, Snapshot, Table};

#[allow(dead_code)]
pub fn merge_tree_table(name: &str, columns: &[&str]) -> Table {
    columns.iter().fold(
        Table::new(name, Engine::MergeTree).with_database("default"),
        |table, column| table.with_column(Column::new(*column, "String")),
    )
}

#[allow(dead_code)]
pub fn snapshot(tables: Vec<Table>) -> Snapshot {
    Snapshot::from_tables(tables)
        .unwrap_or_else(|error| panic!("fixture snapshot should be valid: {error}"))
}
