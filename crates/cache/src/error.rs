use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to serialize cache payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend failure: {0}")]
    Backend(String),

    #[error("Cache computation task failed: {0}")]
    Task(String),
}
