//! Error types for manifest and catalog handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while loading manifests and catalogs.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Document not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Catalog entry '{name}' is defined in both {first} and {second}")]
    DuplicateCatalogEntry {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
