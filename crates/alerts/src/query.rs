//! Read-only alert queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwatch_core::Sku;

use crate::event::{AlertEvent, Severity};

/// Result ordering. Alerts are ordered by log position (`id`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Filter criteria for alert queries. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertFilter {
    pub sku: Option<Sku>,
    pub severity: Option<Severity>,
    /// Inclusive lower bound on the alert timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the alert timestamp.
    pub until: Option<DateTime<Utc>>,
}

impl AlertFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_sku(mut self, sku: Sku) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.since = Some(at);
        self
    }

    pub fn until(mut self, at: DateTime<Utc>) -> Self {
        self.until = Some(at);
        self
    }

    pub fn matches(&self, alert: &AlertEvent) -> bool {
        if self.sku.as_ref().is_some_and(|s| *s != alert.sku) {
            return false;
        }
        if self.severity.is_some_and(|s| s != alert.severity) {
            return false;
        }
        if self.since.is_some_and(|t| alert.timestamp < t) {
            return false;
        }
        if self.until.is_some_and(|t| alert.timestamp >= t) {
            return false;
        }
        true
    }
}
