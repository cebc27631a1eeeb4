use thiserror::Error;

/// All the ways things can go wrong in questlog
///
/// Only `CatalogLoad`, `InvalidCatalog` and `Timeout` are fatal for a
/// session. Everything else is reported and the app keeps going.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load quest catalog: {0}")]
    CatalogLoad(String),

    #[error("Quest catalog is malformed: {0}")]
    InvalidCatalog(String),

    #[error("Catalog load timed out after {0} seconds")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] questlog_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
