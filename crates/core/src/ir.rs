mod engine;
mod snapshot;
mod table;

pub use engine::Engine;
pub use snapshot::{Cluster, ClusterNode, Dictionary, MaterializedView, Snapshot, View};
pub use table::{Column, Index, Table, TableName};
