use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request to the valuation source failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid valuation source URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),
}
