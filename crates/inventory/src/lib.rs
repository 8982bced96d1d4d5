//! Inventory reconciliation domain.
//!
//! This crate contains the stock-status rules and transition logic,
//! implemented purely as deterministic domain logic (no IO, no locking, no
//! storage). Infra wires it to a state store and an alert log.

pub mod assess;
pub mod observation;
pub mod state;
pub mod status;

pub use assess::{Assessment, Transition, assess};
pub use observation::{Observation, RawObservation};
pub use state::InventoryState;
pub use status::{ReconcileConfig, StockStatus, derive_status};
