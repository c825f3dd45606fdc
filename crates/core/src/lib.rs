mod adapter;
mod diff;
mod error;
mod executor;
mod generator;
mod introspection;
mod ir;
mod parser;
mod plan;
mod renderer;
mod statistics;

pub use adapter::{CatalogColumn, CatalogDictionary, CatalogIndex, CatalogTable, DatabaseAdapter};
pub use diff::{Action, ActionType, DiffOp, Differ, plan_diff};
pub use error::{
    Arity, BoxError, CatalogError, Error, ExecutionError, GenerateError, ObjectKind, ParseError,
    Result, SchemaError,
};
pub use executor::Executor;
pub use generator::{generate_action, generate_create_table, generate_sql};
pub use introspection::{Introspection, IntrospectionFilter, Introspector};
pub use ir::{
    Cluster, ClusterNode, Column, Dictionary, Engine, Index, MaterializedView, Snapshot, Table,
    TableName, View,
};
pub use parser::{
    EngineClauses, extract_engine_clauses, extract_engine_declaration, extract_parameters,
    parse_engine, split_top_level, supported_engines,
};
pub use plan::Plan;
pub use renderer::Renderer;
pub use statistics::{EngineStatistics, SkippedTable};
