use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwatch_core::{Entity, Sku};

use crate::status::StockStatus;

/// Latest reconciled state of one SKU.
///
/// `status` is always `derive_status(shelf_count, pos_count, threshold)` for
/// the counts stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryState {
    pub sku: Sku,
    pub shelf_count: u32,
    pub pos_count: u32,
    pub status: StockStatus,
    pub last_updated: DateTime<Utc>,
}

impl InventoryState {
    /// Whether the product insights view should suggest a reorder.
    pub fn needs_reorder(&self) -> bool {
        matches!(self.status, StockStatus::Low | StockStatus::OutOfStock)
    }
}

impl Entity for InventoryState {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }
}
