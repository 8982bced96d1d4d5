//! `shelfwatch-forecast`
//!
//! **Responsibility:** demand projection from historical sales.
//!
//! Independent of reconciliation: it only shares the SKU catalog.
//! Runs are read-only and recomputed on every request (no caching).

pub mod forecaster;
pub mod history;
pub mod report;
pub mod result;
pub mod stats;

pub use forecaster::{ForecastPoint, Forecaster};
pub use history::{SalesHistory, SalesRecord};
pub use report::write_forecast_csv;
pub use result::ForecastError;
pub use stats::SeriesStats;
