use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No usable valuation records for '{0}' after cleaning")]
    DataUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
