use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error while contacting the provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The provider returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Failed to read data snapshot: {0}")]
    Snapshot(String),
}

impl ApiError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(e) => e.is_timeout() || e.is_connect(),
            ApiError::Status(code, _) => *code == 429 || *code >= 500,
            ApiError::Deserialization(_) | ApiError::Snapshot(_) => false,
        }
    }
}
