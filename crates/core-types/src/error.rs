use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Valuation must be a finite positive number, got {0}")]
    InvalidValuation(f64),
}
