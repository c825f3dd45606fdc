//! Sub-directories of a schema directory, one per entity kind.

use std::path::Path;

pub const TABLES_DIR: &str = "tables";
pub const VIEWS_DIR: &str = "views";
pub const MATERIALIZED_VIEWS_DIR: &str = "materialized_views";
pub const DICTIONARIES_DIR: &str = "dictionaries";
pub const CLUSTERS_DIR: &str = "clusters";

pub(crate) const YAML_EXTENSION: &str = "yaml";

pub(crate) fn is_yaml_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension == "yaml" || extension == "yml")
}
