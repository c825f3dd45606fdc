use serde::{Deserialize, Serialize};

use super::{Column, Table};
use crate::{ObjectKind, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct View {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub select_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MaterializedView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_table: Option<String>,
    pub select_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dictionary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    pub source: String,
    pub layout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<ClusterNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClusterNode {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub shard: u32,
    #[serde(default)]
    pub replica: u32,
}

/// Complete description of a schema at one point in time.
///
/// Names are unique per collection. The `add_*` constructors reject a second
/// entity with the same name instead of letting the last one win; duplicate
/// detection is the only invariant enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SnapshotDocument")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tables: Vec<Table>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    views: Vec<View>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    materialized_views: Vec<MaterializedView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dictionaries: Vec<Dictionary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    clusters: Vec<Cluster>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Result<Self, SchemaError> {
        let mut snapshot = Self::new();
        for table in tables {
            snapshot.add_table(table)?;
        }
        Ok(snapshot)
    }

    pub fn add_table(&mut self, table: Table) -> Result<(), SchemaError> {
        ensure_unique(ObjectKind::Table, &table.name, self.find_table(&table.name))?;
        self.tables.push(table);
        Ok(())
    }

    pub fn add_view(&mut self, view: View) -> Result<(), SchemaError> {
        ensure_unique(ObjectKind::View, &view.name, self.find_view(&view.name))?;
        self.views.push(view);
        Ok(())
    }

    pub fn add_materialized_view(&mut self, view: MaterializedView) -> Result<(), SchemaError> {
        ensure_unique(
            ObjectKind::MaterializedView,
            &view.name,
            self.find_materialized_view(&view.name),
        )?;
        self.materialized_views.push(view);
        Ok(())
    }

    pub fn add_dictionary(&mut self, dictionary: Dictionary) -> Result<(), SchemaError> {
        ensure_unique(
            ObjectKind::Dictionary,
            &dictionary.name,
            self.find_dictionary(&dictionary.name),
        )?;
        self.dictionaries.push(dictionary);
        Ok(())
    }

    pub fn add_cluster(&mut self, cluster: Cluster) -> Result<(), SchemaError> {
        ensure_unique(
            ObjectKind::Cluster,
            &cluster.name,
            self.find_cluster(&cluster.name),
        )?;
        self.clusters.push(cluster);
        Ok(())
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    #[must_use]
    pub fn materialized_views(&self) -> &[MaterializedView] {
        &self.materialized_views
    }

    #[must_use]
    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.views.is_empty()
            && self.materialized_views.is_empty()
            && self.dictionaries.is_empty()
            && self.clusters.is_empty()
    }

    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    #[must_use]
    pub fn find_view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|view| view.name == name)
    }

    #[must_use]
    pub fn find_materialized_view(&self, name: &str) -> Option<&MaterializedView> {
        self.materialized_views
            .iter()
            .find(|view| view.name == name)
    }

    #[must_use]
    pub fn find_dictionary(&self, name: &str) -> Option<&Dictionary> {
        self.dictionaries
            .iter()
            .find(|dictionary| dictionary.name == name)
    }

    #[must_use]
    pub fn find_cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.name == name)
    }

    /// Fills the database of every table, view, materialized view, and
    /// dictionary that does not name one.
    pub fn resolve_database(&mut self, database: &str) {
        let fill = |slot: &mut Option<String>| {
            if slot.is_none() {
                *slot = Some(database.to_string());
            }
        };

        self.tables
            .iter_mut()
            .for_each(|table| fill(&mut table.database));
        self.views
            .iter_mut()
            .for_each(|view| fill(&mut view.database));
        self.materialized_views
            .iter_mut()
            .for_each(|view| fill(&mut view.database));
        self.dictionaries
            .iter_mut()
            .for_each(|dictionary| fill(&mut dictionary.database));
    }
}

fn ensure_unique<T>(kind: ObjectKind, name: &str, existing: Option<&T>) -> Result<(), SchemaError> {
    match existing {
        Some(_) => Err(SchemaError::DuplicateName {
            kind,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SnapshotDocument {
    #[serde(default)]
    tables: Vec<Table>,
    #[serde(default)]
    views: Vec<View>,
    #[serde(default)]
    materialized_views: Vec<MaterializedView>,
    #[serde(default)]
    dictionaries: Vec<Dictionary>,
    #[serde(default)]
    clusters: Vec<Cluster>,
}

impl TryFrom<SnapshotDocument> for Snapshot {
    type Error = SchemaError;

    fn try_from(document: SnapshotDocument) -> Result<Self, Self::Error> {
        let mut snapshot = Self::from_tables(document.tables)?;
        for view in document.views {
            snapshot.add_view(view)?;
        }
        for view in document.materialized_views {
            snapshot.add_materialized_view(view)?;
        }
        for dictionary in document.dictionaries {
            snapshot.add_dictionary(dictionary)?;
        }
        for cluster in document.clusters {
            snapshot.add_cluster(cluster)?;
        }
        Ok(snapshot)
    }
}
