use std::{error::Error as StdError, fmt};

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
}

/// Parameter count accepted by an engine variant, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    #[must_use]
    pub const fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    #[must_use]
    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn accepts(self, found: usize) -> bool {
        found >= self.min && found <= self.max
    }

    /// Number of parameters short of the minimum; zero when `found` is not too few.
    #[must_use]
    pub const fn missing(self, found: usize) -> usize {
        self.min.saturating_sub(found)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "exactly {}", self.min)
        } else if self.max == self.min + 1 {
            write!(f, "{} or {}", self.min, self.max)
        } else {
            write!(f, "{} to {}", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported engine type: {engine} (declaration `{declaration}`)")]
    UnsupportedEngine { engine: String, declaration: String },

    #[error(
        "malformed {engine} declaration `{declaration}`: expected {expected} parameters, got {found}{}",
        missing_suffix(.expected, .found)
    )]
    MalformedEngineDeclaration {
        engine: &'static str,
        declaration: String,
        expected: Arity,
        found: usize,
    },
}

fn missing_suffix(expected: &Arity, found: &usize) -> String {
    match expected.missing(*found) {
        0 => String::new(),
        missing => format!(" ({missing} missing)"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    MaterializedView,
    Dictionary,
    Cluster,
}

impl ObjectKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::MaterializedView => "materialized view",
            Self::Dictionary => "dictionary",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate {kind} name `{name}` in one snapshot")]
    DuplicateName { kind: ObjectKind, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("invalid payload for {action} on `{target}`: {reason}")]
    InvalidPayload {
        action: &'static str,
        target: String,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog query `{query}` failed: {source}")]
    Query {
        query: &'static str,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(
        "execute statement[{statement_index}] failed after {executed_statements} executed statement(s): {source}; sql: {sql}"
    )]
    StatementFailed {
        statement_index: usize,
        sql: String,
        executed_statements: usize,
        #[source]
        source: BoxError,
    },
}
