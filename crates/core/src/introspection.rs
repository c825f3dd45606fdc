//! Builds a snapshot of the live schema from catalog rows.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::{
    BoxError, CatalogColumn, CatalogDictionary, CatalogError, CatalogIndex, CatalogTable, Column,
    DatabaseAdapter, Dictionary, Engine, EngineStatistics, Index, MaterializedView, Result,
    SkippedTable, Snapshot, Table, View, extract_engine_clauses, parse_engine,
    parser::KAFKA_ENGINE_SETTINGS, split_top_level, supported_engines,
};

const SYSTEM_DATABASES: [&str; 3] = ["system", "information_schema", "INFORMATION_SCHEMA"];

const VIEW_ENGINE: &str = "View";
const MATERIALIZED_VIEW_ENGINE: &str = "MaterializedView";
const DICTIONARY_ENGINE: &str = "Dictionary";

/// Restricts introspection to some databases and table names.
/// An empty list does not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntrospectionFilter {
    pub databases: Vec<String>,
    pub tables: Vec<String>,
}

impl IntrospectionFilter {
    #[must_use]
    pub fn database(database: impl Into<String>) -> Self {
        Self {
            databases: vec![database.into()],
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn matches(&self, database: &str, name: &str) -> bool {
        !SYSTEM_DATABASES.contains(&database)
            && (self.databases.is_empty() || self.databases.iter().any(|db| db == database))
            && (self.tables.is_empty() || self.tables.iter().any(|table| table == name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Introspection {
    pub snapshot: Snapshot,
    pub statistics: EngineStatistics,
}

pub struct Introspector<'a> {
    adapter: &'a dyn DatabaseAdapter,
    filter: IntrospectionFilter,
}

impl<'a> Introspector<'a> {
    #[must_use]
    pub fn new(adapter: &'a dyn DatabaseAdapter, filter: IntrospectionFilter) -> Self {
        Self { adapter, filter }
    }

    /// Reads every matching catalog entity.
    ///
    /// A table whose engine declaration cannot be parsed is recorded as a
    /// failure in the statistics and left out of the snapshot; catalog query
    /// failures abort the run.
    pub fn introspect(&self) -> Result<Introspection> {
        let mut rows: Vec<CatalogTable> = self
            .adapter
            .list_tables()
            .map_err(query_failed("system.tables"))?
            .into_iter()
            .filter(|row| self.filter.matches(&row.database, &row.name))
            .collect();
        rows.sort_by(|left, right| {
            (&left.database, &left.name).cmp(&(&right.database, &right.name))
        });

        let mut introspection = Introspection::default();
        for row in &rows {
            introspection.statistics.record_seen(&row.engine);
        }

        let mut dictionaries = self.dictionaries_by_name(&rows)?;

        for row in &rows {
            match row.engine.as_str() {
                VIEW_ENGINE => {
                    introspection.snapshot.add_view(view_from_row(row))?;
                }
                MATERIALIZED_VIEW_ENGINE => {
                    introspection
                        .snapshot
                        .add_materialized_view(materialized_view_from_row(row))?;
                }
                DICTIONARY_ENGINE => {
                    let key = (row.database.clone(), row.name.clone());
                    let Some(dictionary) = dictionaries.remove(&key) else {
                        warn!(
                            database = %row.database,
                            table = %row.name,
                            "dictionary metadata not found; skipping"
                        );
                        continue;
                    };
                    introspection.snapshot.add_dictionary(dictionary)?;
                }
                engine if supported_engines().any(|supported| supported == engine) => {
                    let engine = match parse_engine(&row.engine, &row.engine_full) {
                        Ok(engine) => engine,
                        Err(error) => {
                            let reason = error.to_string();
                            warn!(
                                database = %row.database,
                                table = %row.name,
                                engine = %row.engine,
                                %reason,
                                "skipping table with unreadable engine"
                            );
                            introspection.statistics.record_failure(SkippedTable {
                                database: row.database.clone(),
                                name: row.name.clone(),
                                engine: row.engine.clone(),
                                reason,
                            });
                            continue;
                        }
                    };
                    introspection
                        .snapshot
                        .add_table(self.read_table(row, engine)?)?;
                }
                engine => {
                    debug!(
                        database = %row.database,
                        table = %row.name,
                        engine,
                        "engine is not modeled; skipping"
                    );
                    continue;
                }
            }

            introspection.statistics.record_dumped(&row.engine);
        }

        info!(
            dumped = introspection.statistics.total_dumped(),
            skipped = introspection.statistics.total_skipped(),
            "introspection finished"
        );
        Ok(introspection)
    }

    fn read_table(&self, row: &CatalogTable, engine: Engine) -> Result<Table> {
        debug!(database = %row.database, table = %row.name, engine = %row.engine, "reading table");

        let mut clauses = extract_engine_clauses(&row.engine_full);
        if matches!(engine, Engine::Kafka { .. }) {
            for key in KAFKA_ENGINE_SETTINGS {
                clauses.settings.remove(key);
            }
        }

        let mut table = Table::new(row.name.clone(), engine).with_database(row.database.clone());
        table.order_by = split_sorting_key(&row.sorting_key);
        table.partition_by = non_empty(&row.partition_key);
        table.ttl = clauses.ttl;
        table.settings = clauses.settings;

        table.columns = self
            .adapter
            .list_columns(&row.database, &row.name)
            .map_err(query_failed("system.columns"))?
            .into_iter()
            .map(column_from_row)
            .collect();

        table.indexes = self
            .adapter
            .list_data_skipping_indices(&row.database, &row.name)
            .map_err(query_failed("system.data_skipping_indices"))?
            .into_iter()
            .map(index_from_row)
            .collect();

        Ok(table)
    }

    fn dictionaries_by_name(
        &self,
        rows: &[CatalogTable],
    ) -> Result<BTreeMap<(String, String), Dictionary>> {
        if !rows.iter().any(|row| row.engine == DICTIONARY_ENGINE) {
            return Ok(BTreeMap::new());
        }

        let dictionaries = self
            .adapter
            .list_dictionaries()
            .map_err(query_failed("system.dictionaries"))?;

        Ok(dictionaries
            .into_iter()
            .map(|row| {
                let key = (row.database.clone(), row.name.clone());
                (key, dictionary_from_row(row))
            })
            .collect())
    }
}

fn query_failed(query: &'static str) -> impl FnOnce(BoxError) -> CatalogError {
    move |source| CatalogError::Query { query, source }
}

/// `a, b, intHash32(c)` gives three keys; commas inside calls do not split.
fn split_sorting_key(sorting_key: &str) -> Vec<String> {
    if sorting_key.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(sorting_key)
        .into_iter()
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn column_from_row(row: CatalogColumn) -> Column {
    Column {
        name: row.name,
        data_type: row.data_type,
        default_expression: non_empty(&row.default_expression),
        codec: non_empty(&row.compression_codec),
        comment: non_empty(&row.comment),
    }
}

fn index_from_row(row: CatalogIndex) -> Index {
    Index::new(row.name, row.expr, row.index_type, row.granularity)
}

fn view_from_row(row: &CatalogTable) -> View {
    View {
        name: row.name.clone(),
        database: Some(row.database.clone()),
        select_query: row.as_select.clone(),
    }
}

fn materialized_view_from_row(row: &CatalogTable) -> MaterializedView {
    MaterializedView {
        name: row.name.clone(),
        database: Some(row.database.clone()),
        destination_table: destination_table(&row.create_table_query),
        select_query: row.as_select.clone(),
    }
}

/// Target of `CREATE MATERIALIZED VIEW ... TO db.table ... AS SELECT`.
/// Views storing into an implicit inner table have none.
fn destination_table(create_table_query: &str) -> Option<String> {
    let head = create_table_query
        .find(" AS ")
        .map_or(create_table_query, |end| &create_table_query[..end]);
    let (_, rest) = head.split_once(" TO ")?;
    let target = rest.split_whitespace().next()?;
    let target: String = target.chars().filter(|ch| *ch != '`').collect();
    (!target.is_empty()).then_some(target)
}

fn dictionary_from_row(row: CatalogDictionary) -> Dictionary {
    let attributes = row
        .key_names
        .iter()
        .zip(&row.key_types)
        .chain(row.attribute_names.iter().zip(&row.attribute_types))
        .map(|(name, data_type)| Column::new(name.clone(), data_type.clone()))
        .collect();
    let lifetime = (row.lifetime_min != 0 || row.lifetime_max != 0)
        .then(|| format!("MIN {} MAX {}", row.lifetime_min, row.lifetime_max));

    Dictionary {
        name: row.name,
        database: Some(row.database),
        attributes,
        primary_key: row.key_names,
        source: row.source,
        layout: row.layout,
        lifetime,
    }
}
