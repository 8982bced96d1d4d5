//! Reconciliation pipeline (application-level orchestration).
//!
//! ```text
//! Observation
//!   ↓
//! 1. Resolve the SKU in the catalog (UnknownSku otherwise)
//!   ↓
//! 2. Load the previous state from the store
//!   ↓
//! 3. Assess (pure: derive status, detect transition, check timestamp order)
//!   ↓
//! 4. Replace the SKU's state in the store
//!   ↓
//! 5. Append an alert if the transition enters an abnormal status
//!    (on failure, the previous state is written back)
//! ```
//!
//! Steps 1–5 run under one engine-wide gate, so two observations are never
//! reconciled at the same time and "previous status" cannot race. Readers of
//! the store and the alert log are not blocked by the gate.
//!
//! Rejections (unknown SKU, invalid observation) happen before step 4 and
//! leave both the store and the log untouched. A failed write in step 4 or 5
//! leaves the stored state and the log as they were before the call, so a
//! retry of the same observation raises the alert exactly once.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use shelfwatch_alerts::{AlertEvent, AlertLog, AlertLogError, NewAlert};
use shelfwatch_core::{Catalog, DomainError};
use shelfwatch_inventory::{InventoryState, Observation, ReconcileConfig, assess};

use crate::read_model::{StateStore, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The observation was rejected; nothing was mutated.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    AlertLog(#[from] AlertLogError),

    #[error("reconciliation gate poisoned")]
    Poisoned,
}

impl EngineError {
    /// Whether this is a per-observation rejection (as opposed to a broken store).
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::Domain(_))
    }
}

/// Outcome of reconciling one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub state: InventoryState,
    pub alert: Option<AlertEvent>,
}

/// Turns observations into stored state and alert events.
#[derive(Debug)]
pub struct ReconciliationEngine<S, L>
where
    S: StateStore,
    L: AlertLog,
{
    catalog: Arc<Catalog>,
    store: S,
    log: L,
    config: ReconcileConfig,
    gate: Mutex<()>,
}

impl<S, L> ReconciliationEngine<S, L>
where
    S: StateStore,
    L: AlertLog,
{
    pub fn new(catalog: Arc<Catalog>, store: S, log: L) -> Self {
        Self {
            catalog,
            store,
            log,
            config: ReconcileConfig::default(),
            gate: Mutex::new(()),
        }
    }

    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn alert_log(&self) -> &L {
        &self.log
    }

    /// Snapshot of all reconciled states, in catalog order.
    pub fn snapshot(&self) -> Result<Vec<InventoryState>, EngineError> {
        Ok(self.store.list()?)
    }

    /// Reconcile one observation.
    ///
    /// Emits an alert only when the SKU's status changes into an abnormal
    /// one; the first observation of a SKU only seeds its state.
    pub fn reconcile(&self, observation: &Observation) -> Result<Reconciled, EngineError> {
        let _gate = self.gate.lock().map_err(|_| EngineError::Poisoned)?;

        let item = self.catalog.require(&observation.sku)?;
        let previous = self.store.get(&observation.sku)?;
        let assessment = assess(previous.as_ref(), observation, item, &self.config)?;

        let new_alert = assessment.transition.and_then(|transition| {
            tracing::debug!(
                sku = %observation.sku,
                from = %transition.previous,
                to = %transition.new,
                "status transition"
            );
            let alert = NewAlert::for_transition(observation.sku.clone(), observation.timestamp, transition);
            if alert.is_none() {
                tracing::info!(sku = %observation.sku, from = %transition.previous, "condition cleared");
            }
            alert
        });

        self.store.upsert(assessment.state.clone())?;

        let alert = match new_alert {
            Some(new_alert) => match self.log.append(new_alert) {
                Ok(event) => Some(event),
                Err(err) => {
                    self.roll_back(previous);
                    return Err(err.into());
                }
            },
            None => None,
        };

        Ok(Reconciled {
            state: assessment.state,
            alert,
        })
    }

    /// Write the pre-call state back after a failed alert append.
    ///
    /// Only transitions append alerts, and a transition needs a previous
    /// state, so `previous` is always present here.
    fn roll_back(&self, previous: Option<InventoryState>) {
        let Some(previous) = previous else {
            return;
        };
        let sku = previous.sku.clone();
        if let Err(err) = self.store.upsert(previous) {
            tracing::error!(sku = %sku, error = %err, "failed to restore state after alert append failure");
        }
    }
}
