//! Read-side state: the latest reconciled record per SKU.

pub mod state_store;

pub use state_store::{InMemoryStateStore, StateStore, StoreError};
