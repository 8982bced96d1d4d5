use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use shelfwatch_core::Sku;
use shelfwatch_inventory::RawObservation;

use super::{Next, ObservationSource, SourceError};

/// Per-SKU count produced by the vision detector for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfCount {
    pub sku: Sku,
    pub count: i64,
}

/// Opaque object-detection capability: one call captures and analyzes a frame.
pub trait ShelfDetector: Send {
    fn detect(&mut self) -> Result<Vec<ShelfCount>, SourceError>;
}

/// Point-of-sale capability.
pub trait PosFeed: Send {
    fn pos_count(&mut self, sku: &Sku) -> Result<i64, SourceError>;
}

/// Combines a detector and a POS feed into an observation source.
///
/// Each tick captures one frame, yields one observation per detected SKU, then
/// reports `Idle` so the next tick captures a fresh frame.
pub struct DetectorPosAdapter<D, P> {
    detector: D,
    pos: P,
    clock: fn() -> DateTime<Utc>,
    pending: VecDeque<RawObservation>,
    frame_drained: bool,
}

impl<D, P> DetectorPosAdapter<D, P>
where
    D: ShelfDetector,
    P: PosFeed,
{
    pub fn new(detector: D, pos: P) -> Self {
        Self {
            detector,
            pos,
            clock: Utc::now,
            pending: VecDeque::new(),
            frame_drained: false,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Capture a frame; on failure nothing from it is queued.
    fn capture_frame(&mut self) -> Result<(), SourceError> {
        let counts = self.detector.detect()?;
        let timestamp = (self.clock)();
        let mut frame = Vec::with_capacity(counts.len());
        for shelf in counts {
            let pos_count = self.pos.pos_count(&shelf.sku)?;
            frame.push(RawObservation {
                sku: shelf.sku,
                shelf_count: shelf.count,
                pos_count,
                timestamp,
            });
        }
        tracing::trace!(observations = frame.len(), "frame captured");
        self.pending.extend(frame);
        Ok(())
    }
}

impl<D, P> ObservationSource for DetectorPosAdapter<D, P>
where
    D: ShelfDetector,
    P: PosFeed,
{
    fn next_observation(&mut self) -> Result<Next, SourceError> {
        if self.pending.is_empty() {
            if self.frame_drained {
                self.frame_drained = false;
                return Ok(Next::Idle);
            }
            self.capture_frame()?;
            self.frame_drained = true;
        }

        match self.pending.pop_front() {
            Some(raw) => Ok(Next::Observation(raw.normalize()?)),
            None => {
                self.frame_drained = false;
                Ok(Next::Idle)
            }
        }
    }
}
