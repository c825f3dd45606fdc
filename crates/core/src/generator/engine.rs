use std::fmt;

use super::quote_literal;
use crate::Engine;

/// Renders the engine declaration exactly as `parse_engine` reads it back.
/// Paths, replica names, and the Distributed and Kafka string arguments are
/// quoted; column names and expressions are bare.
impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::MergeTree | Self::AggregatingMergeTree | Self::Log => write!(f, "{name}()"),
            Self::ReplicatedMergeTree {
                zoo_path,
                replica_name,
            }
            | Self::ReplicatedAggregatingMergeTree {
                zoo_path,
                replica_name,
            } => write!(
                f,
                "{name}({}, {})",
                quote_literal(zoo_path),
                quote_literal(replica_name)
            ),
            Self::ReplacingMergeTree { version_column } => {
                let version_column = version_column.as_deref().unwrap_or_default();
                write!(f, "{name}({version_column})")
            }
            Self::ReplicatedReplacingMergeTree {
                zoo_path,
                replica_name,
                version_column,
            } => {
                write!(
                    f,
                    "{name}({}, {}",
                    quote_literal(zoo_path),
                    quote_literal(replica_name)
                )?;
                if let Some(version_column) = version_column {
                    write!(f, ", {version_column}")?;
                }
                f.write_str(")")
            }
            Self::SummingMergeTree { sum_columns } if sum_columns.is_empty() => {
                write!(f, "{name}()")
            }
            Self::SummingMergeTree { sum_columns } => {
                write!(f, "{name}(({}))", sum_columns.join(", "))
            }
            Self::CollapsingMergeTree { sign_column } => write!(f, "{name}({sign_column})"),
            Self::ReplicatedCollapsingMergeTree {
                zoo_path,
                replica_name,
                sign_column,
            } => write!(
                f,
                "{name}({}, {}, {sign_column})",
                quote_literal(zoo_path),
                quote_literal(replica_name)
            ),
            Self::Distributed {
                cluster_name,
                remote_database,
                remote_table,
                sharding_key,
            } => {
                write!(
                    f,
                    "{name}({}, {}, {}",
                    quote_literal(cluster_name),
                    quote_literal(remote_database),
                    quote_literal(remote_table)
                )?;
                if let Some(sharding_key) = sharding_key {
                    write!(f, ", {sharding_key}")?;
                }
                f.write_str(")")
            }
            Self::Kafka {
                broker_list,
                topic,
                consumer_group,
                format,
            } => write!(
                f,
                "{name}({}, {}, {}, {})",
                quote_literal(&broker_list.join(",")),
                quote_literal(topic),
                quote_literal(consumer_group),
                quote_literal(format)
            ),
        }
    }
}
