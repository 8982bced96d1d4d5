use std::collections::VecDeque;
use std::io::BufRead;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use shelfwatch_core::Sku;
use shelfwatch_inventory::{Observation, RawObservation};

use super::{Next, ObservationSource, SourceError};

#[derive(Debug, Clone)]
enum Step {
    Reading(RawObservation),
    EndOfTick,
}

/// Replays a fixed sequence of per-tick observation batches.
///
/// Used for simulation runs and to drive sessions deterministically in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

/// One line of a JSON-lines recording.
#[derive(Debug, Deserialize)]
struct RecordedLine {
    tick: u64,
    sku: Sku,
    shelf_count: i64,
    pos_count: i64,
    timestamp: DateTime<Utc>,
}

impl ScriptedSource {
    /// Each inner batch is delivered within one tick.
    pub fn from_ticks(ticks: impl IntoIterator<Item = Vec<Observation>>) -> Self {
        let mut steps = VecDeque::new();
        for batch in ticks {
            for obs in batch {
                steps.push_back(Step::Reading(RawObservation {
                    sku: obs.sku,
                    shelf_count: i64::from(obs.shelf_count),
                    pos_count: i64::from(obs.pos_count),
                    timestamp: obs.timestamp,
                }));
            }
            steps.push_back(Step::EndOfTick);
        }
        Self { steps }
    }

    /// Parse a JSON-lines recording.
    ///
    /// Lines carry `{tick, sku, shelf_count, pos_count, timestamp}`; ticks must
    /// not decrease. Blank lines are skipped. Counts are validated on replay,
    /// so a negative count surfaces as `SourceError::Invalid` for that line.
    pub fn from_jsonl(reader: impl BufRead) -> Result<Self, SourceError> {
        let mut steps = VecDeque::new();
        let mut current_tick: Option<u64> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SourceError::Unavailable(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let recorded: RecordedLine = serde_json::from_str(&line).map_err(|e| {
                SourceError::Unavailable(format!("line {}: malformed observation: {e}", idx + 1))
            })?;

            match current_tick {
                Some(t) if recorded.tick < t => {
                    return Err(SourceError::Unavailable(format!(
                        "line {}: tick {} follows tick {t}",
                        idx + 1,
                        recorded.tick
                    )));
                }
                Some(t) if recorded.tick > t => steps.push_back(Step::EndOfTick),
                _ => {}
            }
            current_tick = Some(recorded.tick);

            steps.push_back(Step::Reading(RawObservation {
                sku: recorded.sku,
                shelf_count: recorded.shelf_count,
                pos_count: recorded.pos_count,
                timestamp: recorded.timestamp,
            }));
        }

        if current_tick.is_some() {
            steps.push_back(Step::EndOfTick);
        }
        Ok(Self { steps })
    }

    /// Readings not yet replayed.
    pub fn remaining(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Reading(_)))
            .count()
    }
}

impl ObservationSource for ScriptedSource {
    fn next_observation(&mut self) -> Result<Next, SourceError> {
        match self.steps.pop_front() {
            Some(Step::Reading(raw)) => Ok(Next::Observation(raw.normalize()?)),
            Some(Step::EndOfTick) => Ok(Next::Idle),
            None => Ok(Next::EndOfStream),
        }
    }
}
