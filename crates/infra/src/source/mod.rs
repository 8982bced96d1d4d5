//! Observation source adapters.
//!
//! Sources are pulled by the monitoring loop outside of any store lock; they
//! may block on cameras, models or POS systems.

pub mod detector;
pub mod scripted;

use thiserror::Error;

use shelfwatch_core::DomainError;
use shelfwatch_inventory::Observation;

pub use detector::{DetectorPosAdapter, PosFeed, ShelfCount, ShelfDetector};
pub use scripted::ScriptedSource;

/// Result of pulling a source once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Observation(Observation),
    /// Nothing more for the current tick.
    Idle,
    /// The source is exhausted; the session should finish.
    EndOfStream,
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// A raw reading failed validation (data-quality issue, skip it).
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The detector, POS feed or recording could not be read.
    #[error("observation source failed: {0}")]
    Unavailable(String),
}

/// Producer of normalized observations.
///
/// Implementations guarantee non-negative counts and per-SKU non-decreasing
/// timestamps for everything they yield as `Next::Observation`.
pub trait ObservationSource: Send {
    fn next_observation(&mut self) -> Result<Next, SourceError>;
}

impl<T> ObservationSource for Box<T>
where
    T: ObservationSource + ?Sized,
{
    fn next_observation(&mut self) -> Result<Next, SourceError> {
        (**self).next_observation()
    }
}
