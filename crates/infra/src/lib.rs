//! Infrastructure layer: state store, reconciliation pipeline, observation
//! sources, the monitoring loop, reports and configuration.

pub mod config;
pub mod engine;
pub mod read_model;
pub mod report;
pub mod source;
pub mod workers;

pub use config::{ConfigError, MonitorConfig};
pub use engine::{EngineError, Reconciled, ReconciliationEngine};
pub use read_model::{InMemoryStateStore, StateStore, StoreError};
pub use source::{Next, ObservationSource, ScriptedSource, SourceError};
pub use workers::{LoopSettings, MonitorSession, SessionHandle, SessionStats};
