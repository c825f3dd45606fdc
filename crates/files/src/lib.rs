mod catalog;
mod dumper;
mod error;
mod layout;
mod loader;

pub use catalog::CatalogFile;
pub use dumper::{DumpOptions, Dumper};
pub use error::FilesError;
pub use layout::{CLUSTERS_DIR, DICTIONARIES_DIR, MATERIALIZED_VIEWS_DIR, TABLES_DIR, VIEWS_DIR};
pub use loader::SchemaLoader;
