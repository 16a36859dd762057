use thiserror::Error;

/// Why a single holding could not be evaluated. Never escapes a summary.
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Failed to fetch valuation history: {0}")]
    Fetch(#[from] api_client::error::ApiError),

    #[error("Analytics task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Timed out after {0:?}")]
    TimedOut(std::time::Duration),
}
