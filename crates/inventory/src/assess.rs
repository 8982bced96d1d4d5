//! Decision logic for one observation: new state plus an optional transition.
//!
//! Pure and deterministic. Callers own the previous state and decide what to
//! persist; nothing here mutates anything.

use shelfwatch_core::{CatalogItem, DomainError, DomainResult};

use crate::observation::Observation;
use crate::state::InventoryState;
use crate::status::{ReconcileConfig, StockStatus, derive_status};

/// A status change between two consecutive accepted observations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub previous: StockStatus,
    pub new: StockStatus,
}

/// Outcome of assessing an observation against the previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// State to store in place of the previous one.
    pub state: InventoryState,
    /// `None` for the first observation of a SKU and when the status held.
    pub transition: Option<Transition>,
}

/// Assess `observation` for `item` given the SKU's previous state.
///
/// - The first observation seeds state and never reports a transition.
/// - A timestamp earlier than `previous.last_updated` is rejected.
pub fn assess(
    previous: Option<&InventoryState>,
    observation: &Observation,
    item: &CatalogItem,
    config: &ReconcileConfig,
) -> DomainResult<Assessment> {
    if observation.sku != item.sku {
        return Err(DomainError::invalid_observation(format!(
            "observation for {} assessed against catalog item {}",
            observation.sku, item.sku
        )));
    }

    if let Some(prev) = previous {
        if observation.timestamp < prev.last_updated {
            return Err(DomainError::invalid_observation(format!(
                "timestamp {} for {} precedes last update {}",
                observation.timestamp, observation.sku, prev.last_updated
            )));
        }
    }

    let status = derive_status(
        observation.shelf_count,
        observation.pos_count,
        item.threshold,
        config,
    );

    let transition = previous
        .filter(|prev| prev.status != status)
        .map(|prev| Transition {
            previous: prev.status,
            new: status,
        });

    Ok(Assessment {
        state: InventoryState {
            sku: observation.sku.clone(),
            shelf_count: observation.shelf_count,
            pos_count: observation.pos_count,
            status,
            last_updated: observation.timestamp,
        },
        transition,
    })
}
