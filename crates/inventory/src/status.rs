use serde::{Deserialize, Serialize};

/// Reconciled stock status of one SKU.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    Good,
    Low,
    OutOfStock,
    Mismatch,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Good => "Good",
            StockStatus::Low => "Low",
            StockStatus::OutOfStock => "OutOfStock",
            StockStatus::Mismatch => "Mismatch",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for reconciliation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Largest absolute shelf/POS difference still considered consistent.
    ///
    /// The default of 0 flags any difference.
    pub mismatch_tolerance: u32,
}

impl ReconcileConfig {
    pub fn with_mismatch_tolerance(mut self, tolerance: u32) -> Self {
        self.mismatch_tolerance = tolerance;
        self
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            mismatch_tolerance: 0,
        }
    }
}

/// Derive the status for a pair of counts.
///
/// Rules are checked in order: empty shelf, below threshold, counts
/// disagreeing beyond tolerance, otherwise good.
pub fn derive_status(
    shelf_count: u32,
    pos_count: u32,
    threshold: u32,
    config: &ReconcileConfig,
) -> StockStatus {
    if shelf_count == 0 {
        return StockStatus::OutOfStock;
    }
    if shelf_count < threshold {
        return StockStatus::Low;
    }
    if shelf_count.abs_diff(pos_count) > config.mismatch_tolerance {
        return StockStatus::Mismatch;
    }
    StockStatus::Good
}
