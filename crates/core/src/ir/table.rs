use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::Engine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Sorting key expressions; order is significant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    pub engine: Engine,
}

impl Table {
    pub fn new(name: impl Into<String>, engine: Engine) -> Self {
        Self {
            name: name.into(),
            database: None,
            columns: Vec::new(),
            order_by: Vec::new(),
            partition_by: None,
            ttl: None,
            settings: BTreeMap::new(),
            indexes: Vec::new(),
            engine,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_order_by<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn table_name(&self) -> TableName {
        TableName {
            database: self.database.clone(),
            name: self.name.clone(),
        }
    }

    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Optional fields are tri-state in practice: absent, empty, or set.
/// Absence and the empty string survive a YAML round trip as distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default_expression: None,
            codec: None,
            comment: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Data-skipping index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Index {
    pub name: String,
    pub expression: String,
    /// Index type including its parameters, e.g. `tokenbf_v1(32768, 3, 0)`.
    #[serde(rename = "type")]
    pub index_type: String,
    pub granularity: u64,
}

impl Index {
    pub fn new(
        name: impl Into<String>,
        expression: impl Into<String>,
        index_type: impl Into<String>,
        granularity: u64,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            index_type: index_type.into(),
            granularity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName {
    pub database: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            database: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database {
            Some(database) => write!(f, "{database}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
