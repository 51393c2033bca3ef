use api_client::error::ApiError;
use cache::CacheError;
use thiserror::Error;
use validation::ValidationError;

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("Data provider error: {0}")]
    Provider(#[from] ApiError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to encode analytics payload: {0}")]
    Serialization(#[from] serde_json::Error),
}
