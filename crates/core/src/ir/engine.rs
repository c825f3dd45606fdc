use serde::{Deserialize, Serialize};

/// Storage engine of a table. Exactly one variant per table; each variant
/// carries only the parameters its declaration takes, in declaration order.
///
/// Serialized with the engine name as `kind`, so schema files read
/// `kind: ReplacingMergeTree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Engine {
    MergeTree,
    ReplicatedMergeTree {
        zoo_path: String,
        replica_name: String,
    },
    ReplacingMergeTree {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_column: Option<String>,
    },
    ReplicatedReplacingMergeTree {
        zoo_path: String,
        replica_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_column: Option<String>,
    },
    SummingMergeTree {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        sum_columns: Vec<String>,
    },
    CollapsingMergeTree {
        sign_column: String,
    },
    ReplicatedCollapsingMergeTree {
        zoo_path: String,
        replica_name: String,
        sign_column: String,
    },
    AggregatingMergeTree,
    ReplicatedAggregatingMergeTree {
        zoo_path: String,
        replica_name: String,
    },
    Distributed {
        cluster_name: String,
        remote_database: String,
        remote_table: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sharding_key: Option<String>,
    },
    Log,
    Kafka {
        broker_list: Vec<String>,
        topic: String,
        consumer_group: String,
        format: String,
    },
}

impl Engine {
    /// Engine name as the server spells it in `system.tables.engine`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MergeTree => "MergeTree",
            Self::ReplicatedMergeTree { .. } => "ReplicatedMergeTree",
            Self::ReplacingMergeTree { .. } => "ReplacingMergeTree",
            Self::ReplicatedReplacingMergeTree { .. } => "ReplicatedReplacingMergeTree",
            Self::SummingMergeTree { .. } => "SummingMergeTree",
            Self::CollapsingMergeTree { .. } => "CollapsingMergeTree",
            Self::ReplicatedCollapsingMergeTree { .. } => "ReplicatedCollapsingMergeTree",
            Self::AggregatingMergeTree => "AggregatingMergeTree",
            Self::ReplicatedAggregatingMergeTree { .. } => "ReplicatedAggregatingMergeTree",
            Self::Distributed { .. } => "Distributed",
            Self::Log => "Log",
            Self::Kafka { .. } => "Kafka",
        }
    }

    #[must_use]
    pub const fn is_replicated(&self) -> bool {
        matches!(
            self,
            Self::ReplicatedMergeTree { .. }
                | Self::ReplicatedReplacingMergeTree { .. }
                | Self::ReplicatedCollapsingMergeTree { .. }
                | Self::ReplicatedAggregatingMergeTree { .. }
        )
    }
}
