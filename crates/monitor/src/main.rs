//! Replays a recorded observation stream through a monitoring session and
//! writes the alert, inventory summary and forecast reports.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use shelfwatch_alerts::{AlertFilter, InMemoryAlertLog, export_alerts};
use shelfwatch_core::{CatalogLoader, JsonCatalogLoader};
use shelfwatch_forecast::{Forecaster, SalesHistory, write_forecast_csv};
use shelfwatch_infra::report::write_inventory_summary;
use shelfwatch_infra::{
    InMemoryStateStore, MonitorConfig, MonitorSession, ReconciliationEngine, ScriptedSource,
};

fn main() -> Result<()> {
    shelfwatch_observability::init();

    let config = MonitorConfig::from_env()?;
    let catalog_path = required_path("SHELFWATCH_CATALOG")?;
    let observations_path = required_path("SHELFWATCH_OBSERVATIONS")?;
    let sales_path = std::env::var_os("SHELFWATCH_SALES").map(PathBuf::from);
    let out_dir = std::env::var_os("SHELFWATCH_OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let catalog = JsonCatalogLoader::from_reader(open(&catalog_path)?)?
        .load()
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    let catalog = Arc::new(catalog);

    let history = Arc::new(SalesHistory::new());
    if let Some(path) = &sales_path {
        history
            .import_csv(open(path)?)
            .with_context(|| format!("importing sales {}", path.display()))?;
        for sku in history.skus()? {
            if !catalog.contains(&sku) {
                tracing::warn!(sku = %sku, "sales history for uncataloged sku");
            }
        }
    }

    let source = ScriptedSource::from_jsonl(BufReader::new(open(&observations_path)?))
        .with_context(|| format!("reading observations {}", observations_path.display()))?;

    let store = Arc::new(InMemoryStateStore::for_catalog(&catalog));
    let log = Arc::new(InMemoryAlertLog::new());
    let engine = Arc::new(
        ReconciliationEngine::new(Arc::clone(&catalog), store, Arc::clone(&log))
            .with_config(config.reconcile()),
    );

    let handle = MonitorSession::start(source, Arc::clone(&engine), config.loop_settings())?;
    let session = handle.id();
    let stats = handle.wait();
    tracing::info!(
        session = %session,
        ticks = stats.ticks,
        accepted = stats.accepted,
        rejected = stats.rejected,
        alerts = stats.alerts,
        "replay finished"
    );

    let alerts = export_alerts(&log, &AlertFilter::all(), create(&out_dir.join("alerts.csv"))?)?;
    let rows = write_inventory_summary(
        &catalog,
        &engine.snapshot()?,
        create(&out_dir.join("inventory_summary.csv"))?,
    )?;
    tracing::info!(alerts, rows, out_dir = %out_dir.display(), "reports written");

    if sales_path.is_some() {
        let forecaster = Forecaster::new(Arc::clone(&catalog), Arc::clone(&history));
        let mut points = Vec::new();
        for item in catalog.iter() {
            points.extend(forecaster.forecast(&item.sku, config.forecast_horizon_days)?);

            let trend = history.trend(&item.sku, config.trend_days)?;
            let recent: u64 = trend.iter().map(|r| r.sales_count).sum();
            tracing::info!(sku = %item.sku, days = trend.len(), sales = recent, "recent sales trend");
        }
        write_forecast_csv(&points, create(&out_dir.join("forecast.csv"))?)?;
    }

    Ok(())
}

fn required_path(key: &str) -> Result<PathBuf> {
    std::env::var_os(key)
        .map(PathBuf::from)
        .with_context(|| format!("{key} must be set"))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}
