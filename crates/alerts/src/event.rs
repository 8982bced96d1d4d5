use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwatch_core::{AlertId, Sku};
use shelfwatch_inventory::{StockStatus, Transition};

/// Kind of abnormal condition an alert reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    LowStock,
    OutOfStock,
    Mismatch,
}

impl AlertKind {
    /// The alert raised when a SKU enters `status`.
    ///
    /// Entering `Good` clears a condition and raises nothing.
    pub fn raised_by(status: StockStatus) -> Option<Self> {
        match status {
            StockStatus::Good => None,
            StockStatus::Low => Some(AlertKind::LowStock),
            StockStatus::OutOfStock => Some(AlertKind::OutOfStock),
            StockStatus::Mismatch => Some(AlertKind::Mismatch),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::OutOfStock => Severity::Critical,
            AlertKind::LowStock => Severity::High,
            AlertKind::Mismatch => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LowStock",
            AlertKind::OutOfStock => "OutOfStock",
            AlertKind::Mismatch => "Mismatch",
        }
    }
}

impl core::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert ready to be appended (no id assigned yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub sku: Sku,
    pub timestamp: DateTime<Utc>,
    pub kind: AlertKind,
    pub previous_status: StockStatus,
    pub new_status: StockStatus,
}

impl NewAlert {
    /// Build the alert for a status transition, if the new status warrants one.
    pub fn for_transition(
        sku: Sku,
        timestamp: DateTime<Utc>,
        transition: Transition,
    ) -> Option<Self> {
        let kind = AlertKind::raised_by(transition.new)?;
        Some(Self {
            sku,
            timestamp,
            kind,
            previous_status: transition.previous,
            new_status: transition.new,
        })
    }
}

/// An appended alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Position in the log (monotonic, assigned on append).
    pub id: AlertId,
    pub sku: Sku,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub previous_status: StockStatus,
    pub new_status: StockStatus,
}

impl AlertEvent {
    pub(crate) fn commit(id: AlertId, alert: NewAlert) -> Self {
        Self {
            id,
            severity: alert.kind.severity(),
            sku: alert.sku,
            timestamp: alert.timestamp,
            kind: alert.kind,
            previous_status: alert.previous_status,
            new_status: alert.new_status,
        }
    }
}
