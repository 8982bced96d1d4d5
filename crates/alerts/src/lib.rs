//! Alert events and the append-only alert log.
//!
//! Alerts are facts: once appended they are never reordered, mutated or
//! deleted. The reconciliation engine is the only producer.

pub mod event;
pub mod export;
pub mod log;
pub mod query;

pub use event::{AlertEvent, AlertKind, NewAlert, Severity};
pub use export::{ExportError, export_alerts, export_alerts_to_string};
pub use log::{AlertLog, AlertLogError, AlertSubscription, InMemoryAlertLog};
pub use query::{AlertFilter, SortOrder};
