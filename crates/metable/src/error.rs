use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Invalid metadata key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the SQLite engine (constraint, connectivity, SQL).
    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    /// A setting loaded fine but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MetaError>;
