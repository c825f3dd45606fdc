use std::collections::BTreeMap;

use crate::{Action, Column, DiffOp, Plan, Snapshot, Table};

/// Compares a desired snapshot against the current one.
///
/// Tables and columns are matched by name. Both inputs are keyed through
/// `BTreeMap`s, so the emitted order depends only on names and never on the
/// order entities were added to either snapshot:
///
/// 1. `CreateTable` for each desired-only table, by table name;
/// 2. `DropTable` for each current-only table, by table name;
/// 3. for each table present on both sides, by table name, `AddColumn`
///    actions by column name followed by `DropColumn` actions by column name.
///
/// Same-named columns whose type, default, codec, or comment differ produce
/// no action. Snapshots are expected to hold unique table names; `Snapshot`
/// construction enforces that.
#[derive(Debug, Default, Clone, Copy)]
pub struct Differ;

impl Differ {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn plan(&self, desired: &Snapshot, current: &Snapshot) -> Plan {
        let desired_tables = tables_by_name(desired.tables());
        let current_tables = tables_by_name(current.tables());

        let mut actions = Vec::new();
        self.create_missing_tables(&desired_tables, &current_tables, &mut actions);
        self.drop_extra_tables(&desired_tables, &current_tables, &mut actions);

        for (name, desired_table) in &desired_tables {
            if let Some(current_table) = current_tables.get(name) {
                self.compare_columns(desired_table, current_table, &mut actions);
            }
        }

        Plan::new(actions)
    }

    fn create_missing_tables(
        &self,
        desired: &BTreeMap<&str, &Table>,
        current: &BTreeMap<&str, &Table>,
        actions: &mut Vec<Action>,
    ) {
        for (name, table) in desired {
            if !current.contains_key(name) {
                actions.push(Action::new(
                    DiffOp::CreateTable((*table).clone()),
                    format!(
                        "Table {name} is defined in schema but does not exist in the database."
                    ),
                ));
            }
        }
    }

    fn drop_extra_tables(
        &self,
        desired: &BTreeMap<&str, &Table>,
        current: &BTreeMap<&str, &Table>,
        actions: &mut Vec<Action>,
    ) {
        for (name, table) in current {
            if !desired.contains_key(name) {
                actions.push(Action::new(
                    DiffOp::DropTable(table.table_name()),
                    format!(
                        "Table {name} exists in the database but is not defined in the schema."
                    ),
                ));
            }
        }
    }

    /// Column changes target the live table, so they carry the current side's name.
    fn compare_columns(&self, desired: &Table, current: &Table, actions: &mut Vec<Action>) {
        let desired_columns = columns_by_name(&desired.columns);
        let current_columns = columns_by_name(&current.columns);
        let table_name = current.table_name();

        for (name, column) in &desired_columns {
            if !current_columns.contains_key(name) {
                actions.push(Action::new(
                    DiffOp::AddColumn {
                        table: table_name.clone(),
                        column: Box::new((*column).clone()),
                    },
                    format!(
                        "Column {}.{name} is defined in schema but does not exist in the table.",
                        current.name
                    ),
                ));
            }
        }

        for name in current_columns.keys() {
            if !desired_columns.contains_key(name) {
                actions.push(Action::new(
                    DiffOp::DropColumn {
                        table: table_name.clone(),
                        column: (*name).to_string(),
                    },
                    format!(
                        "Column {}.{name} exists in the table but is not defined in the schema.",
                        current.name
                    ),
                ));
            }
        }
    }
}

/// Shorthand for `Differ::new().plan(desired, current)`.
#[must_use]
pub fn plan_diff(desired: &Snapshot, current: &Snapshot) -> Plan {
    Differ::new().plan(desired, current)
}

fn tables_by_name(tables: &[Table]) -> BTreeMap<&str, &Table> {
    tables
        .iter()
        .map(|table| (table.name.as_str(), table))
        .collect()
}

fn columns_by_name(columns: &[Column]) -> BTreeMap<&str, &Column> {
    columns
        .iter()
        .map(|column| (column.name.as_str(), column))
        .collect()
}
