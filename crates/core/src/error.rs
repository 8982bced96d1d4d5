//! Domain error model.

use thiserror::Error;

use crate::id::Sku;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant describes a rejection local to one observation or request.
/// None of them are fatal: callers drop the offending input and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An observation or request referenced a SKU missing from the catalog.
    #[error("unknown sku: {0}")]
    UnknownSku(Sku),

    /// An observation carried negative counts or went back in time.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    /// No sales history exists to derive statistics from.
    #[error("insufficient sales history for sku {0}")]
    InsufficientHistory(Sku),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A conflict occurred (e.g. the same SKU cataloged twice).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn unknown_sku(sku: &Sku) -> Self {
        Self::UnknownSku(sku.clone())
    }

    pub fn invalid_observation(msg: impl Into<String>) -> Self {
        Self::InvalidObservation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
