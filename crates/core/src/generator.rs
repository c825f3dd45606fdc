//! DDL text for tables and planned actions.

mod engine;

use crate::{Action, ActionType, Column, DiffOp, GenerateError, Plan, Table, TableName};

const DEFAULT_DATABASE: &str = "default";

/// Canonical `CREATE TABLE` statement for `table`.
///
/// Clause order follows the server's own rendering: columns, indexes,
/// engine, `PARTITION BY`, `ORDER BY`, `TTL`, `SETTINGS`. Settings are
/// emitted in key order.
#[must_use]
pub fn generate_create_table(table: &Table) -> String {
    let database = table.database.as_deref().unwrap_or(DEFAULT_DATABASE);
    let mut sql = format!("CREATE TABLE {database}.{} (\n", table.name);

    let definitions: Vec<String> = table
        .columns
        .iter()
        .map(|column| column_definition(&format!("  `{}`", column.name), column))
        .chain(table.indexes.iter().map(|index| {
            format!(
                "  INDEX `{}` {} TYPE {} GRANULARITY {}",
                index.name, index.expression, index.index_type, index.granularity
            )
        }))
        .collect();
    sql.push_str(&definitions.join(",\n"));

    sql.push_str("\n) ENGINE = ");
    sql.push_str(&table.engine.to_string());

    if let Some(partition_by) = non_empty(table.partition_by.as_deref()) {
        sql.push_str("\nPARTITION BY ");
        sql.push_str(partition_by);
    }

    match table.order_by.as_slice() {
        [] => {}
        [key] => {
            sql.push_str("\nORDER BY ");
            sql.push_str(key);
        }
        keys => {
            sql.push_str("\nORDER BY (");
            sql.push_str(&keys.join(", "));
            sql.push(')');
        }
    }

    if let Some(ttl) = non_empty(table.ttl.as_deref()) {
        sql.push_str("\nTTL ");
        sql.push_str(ttl);
    }

    if !table.settings.is_empty() {
        let settings: Vec<String> = table
            .settings
            .iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect();
        sql.push_str("\nSETTINGS ");
        sql.push_str(&settings.join(", "));
    }

    sql
}

/// Renders one action as a single DDL statement.
pub fn generate_action(action: &Action) -> Result<String, GenerateError> {
    let action_type = action.action_type();
    match action.op() {
        DiffOp::CreateTable(table) => {
            let target = table.table_name();
            ensure(
                action_type,
                &target,
                !table.name.is_empty(),
                "table name is empty",
            )?;
            ensure(
                action_type,
                &target,
                !table.columns.is_empty(),
                "table has no columns",
            )?;
            Ok(generate_create_table(table))
        }
        DiffOp::DropTable(table) => {
            ensure(
                action_type,
                table,
                !table.name.is_empty(),
                "table name is empty",
            )?;
            Ok(format!("DROP TABLE {table}"))
        }
        DiffOp::AddColumn { table, column } => {
            ensure(
                action_type,
                table,
                !table.name.is_empty(),
                "table name is empty",
            )?;
            ensure(
                action_type,
                table,
                !column.name.is_empty(),
                "column name is empty",
            )?;
            ensure(
                action_type,
                table,
                !column.data_type.is_empty(),
                "column type is empty",
            )?;
            Ok(format!(
                "ALTER TABLE {table} ADD COLUMN {}",
                column_definition(&column.name, column)
            ))
        }
        DiffOp::DropColumn { table, column } => {
            ensure(
                action_type,
                table,
                !table.name.is_empty(),
                "table name is empty",
            )?;
            ensure(
                action_type,
                table,
                !column.is_empty(),
                "column name is empty",
            )?;
            Ok(format!("ALTER TABLE {table} DROP COLUMN {column}"))
        }
    }
}

/// Renders every action of `plan` in order. The first invalid action aborts
/// generation; nothing is skipped.
pub fn generate_sql(plan: &Plan) -> Result<Vec<String>, GenerateError> {
    plan.actions().iter().map(generate_action).collect()
}

fn ensure(
    action: ActionType,
    target: &TableName,
    holds: bool,
    reason: &'static str,
) -> Result<(), GenerateError> {
    if holds {
        Ok(())
    } else {
        Err(GenerateError::InvalidPayload {
            action: action.as_str(),
            target: target.to_string(),
            reason,
        })
    }
}

fn column_definition(name: &str, column: &Column) -> String {
    let mut definition = format!("{name} {}", column.data_type);
    if let Some(default) = non_empty(column.default_expression.as_deref()) {
        definition.push_str(" DEFAULT ");
        definition.push_str(default);
    }
    if let Some(codec) = non_empty(column.codec.as_deref()) {
        definition.push(' ');
        definition.push_str(codec);
    }
    if let Some(comment) = non_empty(column.comment.as_deref()) {
        definition.push_str(" COMMENT ");
        definition.push_str(&quote_literal(comment));
    }
    definition
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Single-quoted string literal with `\` and `'` escaped.
pub(crate) fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\\' || ch == '\'' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}
