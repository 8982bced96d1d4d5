use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use shelfwatch_alerts::{AlertFilter, AlertKind, AlertLog, InMemoryAlertLog, SortOrder};
use shelfwatch_core::{Catalog, CatalogItem, Sku};
use shelfwatch_infra::source::{DetectorPosAdapter, PosFeed, ShelfCount, ShelfDetector};
use shelfwatch_infra::{
    InMemoryStateStore, LoopSettings, MonitorSession, Next, ObservationSource, ReconciliationEngine,
    ScriptedSource, SourceError, StateStore,
};
use shelfwatch_inventory::{Observation, StockStatus};

type Engine = ReconciliationEngine<Arc<InMemoryStateStore>, Arc<InMemoryAlertLog>>;

fn sku(s: &str) -> Sku {
    Sku::new(s).unwrap()
}

fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, secs).unwrap()
}

fn obs(s: &str, shelf: u32, pos: u32, secs: u32) -> Observation {
    Observation::new(sku(s), shelf, pos, at(secs))
}

fn test_engine() -> (Arc<Engine>, Arc<InMemoryAlertLog>) {
    let catalog = Catalog::new(vec![
        CatalogItem::new(sku("A123"), "Product A", 10),
        CatalogItem::new(sku("B456"), "Product B", 5),
    ])
    .unwrap();
    let store = Arc::new(InMemoryStateStore::for_catalog(&catalog));
    let log = Arc::new(InMemoryAlertLog::new());
    let engine = ReconciliationEngine::new(Arc::new(catalog), store, Arc::clone(&log));
    (Arc::new(engine), log)
}

fn fast() -> LoopSettings {
    LoopSettings {
        tick_interval: Duration::from_millis(5),
        ..LoopSettings::default()
    }
}

#[test]
fn session_replays_script_until_end_of_stream() {
    let (engine, log) = test_engine();
    let source = ScriptedSource::from_ticks(vec![
        vec![obs("A123", 15, 15, 0), obs("B456", 12, 4, 0)],
        vec![obs("A123", 8, 8, 1)],
        vec![obs("A123", 8, 8, 2)],
        vec![obs("A123", 0, 5, 3)],
    ]);

    let handle = MonitorSession::start(source, Arc::clone(&engine), fast()).unwrap();
    let stats = handle.wait();

    assert_eq!(stats.accepted, 5);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.alerts, 2);

    let kinds: Vec<_> = log
        .query(&AlertFilter::all(), SortOrder::OldestFirst)
        .unwrap()
        .into_iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![AlertKind::LowStock, AlertKind::OutOfStock]);

    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].sku, sku("A123"));
    assert_eq!(snapshot[0].status, StockStatus::OutOfStock);
    assert_eq!(snapshot[1].status, StockStatus::Mismatch);
}

#[test]
fn rejected_observations_do_not_halt_the_loop() {
    let (engine, log) = test_engine();
    let recording = r#"
{"tick": 0, "sku": "A123", "shelf_count": 15, "pos_count": 15, "timestamp": "2024-03-01T09:00:00Z"}
{"tick": 0, "sku": "Z999", "shelf_count": 3, "pos_count": 3, "timestamp": "2024-03-01T09:00:00Z"}
{"tick": 1, "sku": "A123", "shelf_count": -4, "pos_count": 2, "timestamp": "2024-03-01T09:00:01Z"}
{"tick": 2, "sku": "A123", "shelf_count": 2, "pos_count": 2, "timestamp": "2024-03-01T09:00:02Z"}
"#;
    let source = ScriptedSource::from_jsonl(recording.as_bytes()).unwrap();

    let stats = MonitorSession::start(source, Arc::clone(&engine), fast())
        .unwrap()
        .wait();

    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.rejected, 2);
    assert_eq!(log.len().unwrap(), 1);
    assert_eq!(engine.store().get(&sku("A123")).unwrap().unwrap().status, StockStatus::Low);
    assert!(engine.store().get(&sku("Z999")).unwrap().is_none());
}

#[test]
fn paused_session_submits_no_ticks_until_resumed() {
    let (engine, _log) = test_engine();
    let source = ScriptedSource::from_ticks(vec![vec![obs("A123", 15, 15, 0)]]);
    let settings = LoopSettings {
        start_paused: true,
        ..fast()
    };

    let handle = MonitorSession::start(source, Arc::clone(&engine), settings).unwrap();
    thread::sleep(Duration::from_millis(50));

    assert!(handle.is_paused());
    assert_eq!(handle.stats().ticks, 0);
    assert!(engine.snapshot().unwrap().is_empty());

    handle.resume();
    let stats = handle.wait();
    assert_eq!(stats.accepted, 1);
    assert_eq!(engine.snapshot().unwrap().len(), 1);
}

struct Shelf(Vec<ShelfCount>);

impl ShelfDetector for Shelf {
    fn detect(&mut self) -> Result<Vec<ShelfCount>, SourceError> {
        Ok(self.0.clone())
    }
}

struct Register(HashMap<Sku, i64>);

impl PosFeed for Register {
    fn pos_count(&mut self, sku: &Sku) -> Result<i64, SourceError> {
        Ok(self.0.get(sku).copied().unwrap_or(0))
    }
}

#[test]
fn live_session_runs_until_stopped() {
    let (engine, log) = test_engine();
    let subscription = log.subscribe();
    let source = DetectorPosAdapter::new(
        Shelf(vec![ShelfCount {
            sku: sku("A123"),
            count: 3,
        }]),
        Register(HashMap::from([(sku("A123"), 3)])),
    );

    let handle = MonitorSession::start(source, Arc::clone(&engine), fast()).unwrap();
    thread::sleep(Duration::from_millis(60));
    assert!(!handle.is_finished());

    let stats = handle.stop();
    assert!(stats.ticks > 1);
    assert!(stats.accepted > 1);
    // Steady low stock: seeded on the first frame, never re-alerted.
    assert_eq!(stats.alerts, 0);
    assert!(subscription.drain().is_empty());
    assert_eq!(engine.store().get(&sku("A123")).unwrap().unwrap().status, StockStatus::Low);
}

struct FaultySource;

impl ObservationSource for FaultySource {
    fn next_observation(&mut self) -> Result<Next, SourceError> {
        panic!("detector driver crashed");
    }
}

#[test]
fn panicking_worker_is_reported_finished() {
    let (engine, _log) = test_engine();
    let handle = MonitorSession::start(FaultySource, engine, fast()).unwrap();

    let mut waited = Duration::ZERO;
    while !handle.is_finished() && waited < Duration::from_secs(2) {
        thread::sleep(Duration::from_millis(5));
        waited += Duration::from_millis(5);
    }

    assert!(handle.is_finished());
    let stats = handle.stop();
    assert_eq!(stats.accepted, 0);
}
