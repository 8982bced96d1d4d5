use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use shelfwatch_alerts::AlertLog;
use shelfwatch_core::SessionId;

use crate::engine::ReconciliationEngine;
use crate::read_model::StateStore;
use crate::source::{Next, ObservationSource, SourceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Cadence of the monitoring loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    /// Upper bound on observations pulled in one tick.
    pub max_observations_per_tick: usize,
    pub start_paused: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            max_observations_per_tick: 64,
            start_paused: false,
        }
    }
}

/// Counters for one session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub ticks: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub alerts: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    alerts: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SessionStats {
        SessionStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            alerts: self.alerts.load(Ordering::Relaxed),
        }
    }
}

/// Handle to pause, resume and stop a running session.
///
/// Dropping the handle without calling `stop` also ends the loop (at its next
/// tick boundary), but does not wait for it.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    paused: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Stop submitting ticks. An observation being reconciled still completes.
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            info!(session = %self.id, "monitoring paused");
        }
    }

    /// Resume ticking. Nothing is pulled for the paused period.
    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            info!(session = %self.id, "monitoring resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Whether the loop has exited: end of stream, shutdown, or a worker panic.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    /// Request shutdown, wait for the loop to exit and release the source.
    pub fn stop(mut self) -> SessionStats {
        let _ = self.shutdown.send(());
        self.join_worker();
        self.counters.snapshot()
    }

    /// Wait for the source to run dry without requesting shutdown.
    pub fn wait(mut self) -> SessionStats {
        self.join_worker();
        self.counters.snapshot()
    }

    fn join_worker(&mut self) {
        if let Some(j) = self.join.take() {
            if j.join().is_err() {
                warn!(session = %self.id, "monitor thread panicked");
            }
        }
    }
}

/// Orchestration loop: pulls observations at a fixed cadence and feeds them,
/// one at a time, to the reconciliation engine.
///
/// The session owns its source for its whole lifetime; the source is
/// released when the loop exits.
#[derive(Debug)]
pub struct MonitorSession;

impl MonitorSession {
    pub fn start<Src, S, L>(
        source: Src,
        engine: Arc<ReconciliationEngine<S, L>>,
        settings: LoopSettings,
    ) -> Result<SessionHandle, SessionError>
    where
        Src: ObservationSource + 'static,
        S: StateStore + 'static,
        L: AlertLog + 'static,
    {
        let id = SessionId::new();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let paused = Arc::new(AtomicBool::new(settings.start_paused));
        let finished = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            id,
            source,
            engine,
            settings,
            paused: Arc::clone(&paused),
            counters: Arc::clone(&counters),
        };
        let done = Arc::clone(&finished);

        let join = thread::Builder::new()
            .name(format!("shelfwatch-monitor-{id}"))
            .spawn(move || {
                let _finished = FinishOnDrop(done);
                worker.run(shutdown_rx);
            })?;

        info!(session = %id, "monitoring session started");

        Ok(SessionHandle {
            id,
            shutdown: shutdown_tx,
            join: Some(join),
            paused,
            finished,
            counters,
        })
    }
}

/// Marks the session finished when the worker exits, including by panic.
struct FinishOnDrop(Arc<AtomicBool>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

enum TickOutcome {
    Continue,
    EndOfStream,
}

struct Worker<Src, S, L>
where
    S: StateStore,
    L: AlertLog,
{
    id: SessionId,
    source: Src,
    engine: Arc<ReconciliationEngine<S, L>>,
    settings: LoopSettings,
    paused: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl<Src, S, L> Worker<Src, S, L>
where
    Src: ObservationSource,
    S: StateStore,
    L: AlertLog,
{
    fn run(mut self, shutdown_rx: mpsc::Receiver<()>) {
        loop {
            if !self.paused.load(Ordering::SeqCst) {
                self.counters.ticks.fetch_add(1, Ordering::Relaxed);
                if let TickOutcome::EndOfStream = self.tick() {
                    info!(session = %self.id, "observation source exhausted");
                    break;
                }
            }

            match shutdown_rx.recv_timeout(self.settings.tick_interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!(session = %self.id, "monitoring session stopped");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => continue,
            }
        }
    }

    fn tick(&mut self) -> TickOutcome {
        for _ in 0..self.settings.max_observations_per_tick {
            // Pulled without holding any store or engine lock.
            let observation = match self.source.next_observation() {
                Ok(Next::Observation(o)) => o,
                Ok(Next::Idle) => break,
                Ok(Next::EndOfStream) => return TickOutcome::EndOfStream,
                Err(SourceError::Invalid(e)) => {
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(session = %self.id, error = %e, "data quality: raw observation rejected");
                    continue;
                }
                Err(e) => {
                    warn!(session = %self.id, error = %e, "observation source unavailable; skipping tick");
                    break;
                }
            };

            match self.engine.reconcile(&observation) {
                Ok(reconciled) => {
                    self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                    if reconciled.alert.is_some() {
                        self.counters.alerts.fetch_add(1, Ordering::Relaxed);
                    }
                    debug!(
                        session = %self.id,
                        sku = %reconciled.state.sku,
                        status = %reconciled.state.status,
                        "observation reconciled"
                    );
                }
                Err(e) => {
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                    if e.is_rejection() {
                        warn!(session = %self.id, sku = %observation.sku, error = %e, "data quality: observation rejected");
                    } else {
                        warn!(session = %self.id, sku = %observation.sku, error = %e, "reconciliation failed");
                    }
                }
            }
        }
        TickOutcome::Continue
    }
}
