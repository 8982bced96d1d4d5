//! Tabular alert export (`id,sku,timestamp,type,severity`).

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::log::{AlertLog, AlertLogError};
use crate::query::{AlertFilter, SortOrder};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    AlertLog(#[from] AlertLogError),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("export is not valid utf-8: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize)]
struct AlertRow<'a> {
    id: u64,
    sku: &'a str,
    timestamp: String,
    #[serde(rename = "type")]
    kind: &'static str,
    severity: &'static str,
}

/// Write matching alerts, oldest first, as CSV with a header row.
///
/// Returns the number of alert rows written.
pub fn export_alerts<L, W>(log: &L, filter: &AlertFilter, writer: W) -> Result<usize, ExportError>
where
    L: AlertLog + ?Sized,
    W: Write,
{
    let alerts = log.query(filter, SortOrder::OldestFirst)?;
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Header is written explicitly so an empty export still has columns.
    out.write_record(["id", "sku", "timestamp", "type", "severity"])?;

    for alert in &alerts {
        out.serialize(AlertRow {
            id: alert.id.value(),
            sku: alert.sku.as_str(),
            timestamp: alert.timestamp.to_rfc3339(),
            kind: alert.kind.as_str(),
            severity: alert.severity.as_str(),
        })?;
    }
    out.flush().map_err(csv::Error::from)?;

    Ok(alerts.len())
}

/// Convenience wrapper returning the CSV document as a string.
pub fn export_alerts_to_string<L>(log: &L, filter: &AlertFilter) -> Result<String, ExportError>
where
    L: AlertLog + ?Sized,
{
    let mut buf = Vec::new();
    export_alerts(log, filter, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ExportError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shelfwatch_core::Sku;
    use shelfwatch_inventory::StockStatus;

    use crate::event::{AlertKind, NewAlert};
    use crate::log::InMemoryAlertLog;

    #[test]
    fn empty_export_has_only_header() {
        let log = InMemoryAlertLog::new();
        let csv = export_alerts_to_string(&log, &AlertFilter::all()).unwrap();
        assert_eq!(csv, "id,sku,timestamp,type,severity\n");
    }

    #[test]
    fn export_writes_one_row_per_alert() {
        let log = InMemoryAlertLog::new();
        log.append(NewAlert {
            sku: Sku::new("A123").unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            kind: AlertKind::LowStock,
            previous_status: StockStatus::Good,
            new_status: StockStatus::Low,
        })
        .unwrap();

        let csv = export_alerts_to_string(&log, &AlertFilter::all()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1,A123,2024-03-01T09:30:00+00:00,LowStock,High");
    }
}
