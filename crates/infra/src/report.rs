//! Inventory summary (daily) report.

use std::io::Write;

use serde::Serialize;

use shelfwatch_core::Catalog;
use shelfwatch_inventory::InventoryState;

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    sku: &'a str,
    name: &'a str,
    shelf_count: u32,
    pos_count: u32,
    status: &'static str,
    reorder: bool,
    last_updated: String,
}

/// Write the state snapshot as CSV, one row per observed SKU.
///
/// Rows follow `states` order (the store already lists in catalog order).
/// SKUs without a catalog entry are skipped.
pub fn write_inventory_summary<W: Write>(
    catalog: &Catalog,
    states: &[InventoryState],
    writer: W,
) -> Result<usize, csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    let mut written = 0;

    for state in states {
        let Some(item) = catalog.get(&state.sku) else {
            tracing::warn!(sku = %state.sku, "state without catalog entry left out of summary");
            continue;
        };
        out.serialize(SummaryRow {
            sku: state.sku.as_str(),
            name: &item.name,
            shelf_count: state.shelf_count,
            pos_count: state.pos_count,
            status: state.status.as_str(),
            reorder: state.needs_reorder(),
            last_updated: state.last_updated.to_rfc3339(),
        })?;
        written += 1;
    }

    out.flush()?;
    Ok(written)
}
