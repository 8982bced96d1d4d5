use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwatch_core::{DomainError, DomainResult, Sku};

/// A normalized per-SKU reading for one monitoring tick.
///
/// Counts are unsigned by construction; observations are transient and only
/// used to derive state and alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub sku: Sku,
    pub shelf_count: u32,
    pub pos_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    pub fn new(sku: Sku, shelf_count: u32, pos_count: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            sku,
            shelf_count,
            pos_count,
            timestamp,
        }
    }
}

/// Un-validated reading as delivered by a detector or POS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    pub sku: Sku,
    pub shelf_count: i64,
    pub pos_count: i64,
    pub timestamp: DateTime<Utc>,
}

impl RawObservation {
    /// Validate counts and convert into an [`Observation`].
    pub fn normalize(self) -> DomainResult<Observation> {
        let shelf_count = count("shelf_count", &self.sku, self.shelf_count)?;
        let pos_count = count("pos_count", &self.sku, self.pos_count)?;
        Ok(Observation {
            sku: self.sku,
            shelf_count,
            pos_count,
            timestamp: self.timestamp,
        })
    }
}

fn count(field: &str, sku: &Sku, value: i64) -> DomainResult<u32> {
    if value < 0 {
        return Err(DomainError::invalid_observation(format!(
            "{field} for {sku} is negative ({value})"
        )));
    }
    u32::try_from(value).map_err(|_| {
        DomainError::invalid_observation(format!("{field} for {sku} is out of range ({value})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(shelf: i64, pos: i64) -> RawObservation {
        RawObservation {
            sku: Sku::new("A123").unwrap(),
            shelf_count: shelf,
            pos_count: pos,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn normalize_keeps_valid_counts() {
        let obs = raw(12, 4).normalize().unwrap();
        assert_eq!(obs.shelf_count, 12);
        assert_eq!(obs.pos_count, 4);
    }

    #[test]
    fn negative_counts_are_invalid() {
        assert!(matches!(
            raw(-1, 4).normalize(),
            Err(DomainError::InvalidObservation(msg)) if msg.contains("shelf_count")
        ));
        assert!(matches!(
            raw(3, -7).normalize(),
            Err(DomainError::InvalidObservation(msg)) if msg.contains("pos_count")
        ));
    }

    #[test]
    fn oversized_counts_are_invalid() {
        assert!(matches!(
            raw(i64::from(u32::MAX) + 1, 0).normalize(),
            Err(DomainError::InvalidObservation(_))
        ));
    }
}
