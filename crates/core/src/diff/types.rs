use std::fmt;

use crate::{Column, Table, TableName};

/// Structural change between two snapshots. Each variant carries exactly
/// what the generator needs to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    CreateTable(Table),
    DropTable(TableName),
    AddColumn {
        table: TableName,
        column: Box<Column>,
    },
    DropColumn {
        table: TableName,
        column: String,
    },
}

impl DiffOp {
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::CreateTable(_) => ActionType::CreateTable,
            Self::DropTable(_) => ActionType::DropTable,
            Self::AddColumn { .. } => ActionType::AddColumn,
            Self::DropColumn { .. } => ActionType::DropColumn,
        }
    }

    /// Qualified name of the table the change applies to.
    #[must_use]
    pub fn target(&self) -> TableName {
        match self {
            Self::CreateTable(table) => table.table_name(),
            Self::DropTable(table)
            | Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. } => table.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionType {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTable => "CREATE_TABLE",
            Self::DropTable => "DROP_TABLE",
            Self::AddColumn => "ADD_COLUMN",
            Self::DropColumn => "DROP_COLUMN",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned change plus the human-readable reason it was planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    op: DiffOp,
    reason: String,
}

impl Action {
    pub fn new(op: DiffOp, reason: impl Into<String>) -> Self {
        Self {
            op,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn op(&self) -> &DiffOp {
        &self.op
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        self.op.action_type()
    }

    #[must_use]
    pub fn into_op(self) -> DiffOp {
        self.op
    }
}
