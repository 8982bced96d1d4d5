use thiserror::Error;

use shelfwatch_core::DomainError;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid sales data: {0}")]
    InvalidInput(String),

    #[error("failed to read or write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
