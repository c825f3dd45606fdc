use std::{io, path::PathBuf};

use chstate_core::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilesError {
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("file {} already exists (use --overwrite to replace)", path.display())]
    AlreadyExists { path: PathBuf },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
