//! Error types for catalog loading.

use thiserror::Error;

/// Errors raised while loading or checking the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Catalog contains no platforms")]
    Empty,

    #[error("Invalid catalog: {0}")]
    Invalid(String),

    #[error("Unknown cloud mask: {0}")]
    UnknownCloudMask(String),
}
