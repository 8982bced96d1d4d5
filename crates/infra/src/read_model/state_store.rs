use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use shelfwatch_core::{Catalog, Sku};
use shelfwatch_inventory::InventoryState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("state store unavailable: lock poisoned")]
    Poisoned,
}

/// Latest inventory state per SKU.
///
/// Single writer (the reconciliation engine), any number of readers. A
/// record is replaced whole, so readers never see a half-applied update.
pub trait StateStore: Send + Sync {
    /// Current state of `sku`; `Ok(None)` until its first upsert.
    fn get(&self, sku: &Sku) -> Result<Option<InventoryState>, StoreError>;

    /// Replace the SKU's state atomically (creating it on first write).
    fn upsert(&self, state: InventoryState) -> Result<(), StoreError>;

    /// Snapshot of every state, in catalog order.
    fn list(&self) -> Result<Vec<InventoryState>, StoreError>;
}

impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    fn get(&self, sku: &Sku) -> Result<Option<InventoryState>, StoreError> {
        (**self).get(sku)
    }

    fn upsert(&self, state: InventoryState) -> Result<(), StoreError> {
        (**self).upsert(state)
    }

    fn list(&self) -> Result<Vec<InventoryState>, StoreError> {
        (**self).list()
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// SKUs in listing order; seeded from the catalog, extended on first upsert.
    order: Vec<Sku>,
    states: HashMap<Sku, InventoryState>,
}

/// In-memory state store guarded by a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inner: RwLock<Inner>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose snapshots follow the catalog's insertion order.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            inner: RwLock::new(Inner {
                order: catalog.skus().cloned().collect(),
                states: HashMap::with_capacity(catalog.len()),
            }),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, sku: &Sku) -> Result<Option<InventoryState>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.states.get(sku).cloned())
    }

    fn upsert(&self, state: InventoryState) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if !inner.states.contains_key(&state.sku) && !inner.order.contains(&state.sku) {
            inner.order.push(state.sku.clone());
        }
        inner.states.insert(state.sku.clone(), state);
        Ok(())
    }

    fn list(&self) -> Result<Vec<InventoryState>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        Ok(inner
            .order
            .iter()
            .filter_map(|sku| inner.states.get(sku).cloned())
            .collect())
    }
}
