use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use thiserror::Error;

use shelfwatch_core::AlertId;

use crate::event::{AlertEvent, NewAlert};
use crate::query::{AlertFilter, SortOrder};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlertLogError {
    /// The log lock was poisoned by a panicking writer.
    #[error("alert log unavailable: lock poisoned")]
    Poisoned,
}

/// Append-only, ordered record of alert events.
pub trait AlertLog: Send + Sync {
    /// Append an alert, assigning the next id.
    ///
    /// Returns the committed event (its `id` is the assigned id).
    fn append(&self, alert: NewAlert) -> Result<AlertEvent, AlertLogError>;

    /// Alerts matching `filter`, in the requested order.
    fn query(&self, filter: &AlertFilter, order: SortOrder) -> Result<Vec<AlertEvent>, AlertLogError>;

    /// Number of alerts appended so far.
    fn len(&self) -> Result<usize, AlertLogError>;

    fn is_empty(&self) -> Result<bool, AlertLogError> {
        Ok(self.len()? == 0)
    }
}

impl<L> AlertLog for std::sync::Arc<L>
where
    L: AlertLog + ?Sized,
{
    fn append(&self, alert: NewAlert) -> Result<AlertEvent, AlertLogError> {
        (**self).append(alert)
    }

    fn query(&self, filter: &AlertFilter, order: SortOrder) -> Result<Vec<AlertEvent>, AlertLogError> {
        (**self).query(filter, order)
    }

    fn len(&self) -> Result<usize, AlertLogError> {
        (**self).len()
    }
}

/// In-memory alert log with live fan-out to subscribers.
///
/// - Ids are assigned under the write lock, so they are gap-free and ordered
/// - Subscribers get every alert appended after they subscribed
/// - Hung-up subscribers are dropped on the next append
#[derive(Debug, Default)]
pub struct InMemoryAlertLog {
    events: RwLock<Vec<AlertEvent>>,
    subscribers: Mutex<Vec<Sender<AlertEvent>>>,
}

impl InMemoryAlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> AlertSubscription {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just stays silent.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        AlertSubscription { rx }
    }

    fn publish(&self, event: &AlertEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

impl AlertLog for InMemoryAlertLog {
    fn append(&self, alert: NewAlert) -> Result<AlertEvent, AlertLogError> {
        let event = {
            let mut events = self.events.write().map_err(|_| AlertLogError::Poisoned)?;
            let id = events
                .last()
                .map(|e| e.id.next())
                .unwrap_or_else(|| AlertId::new(1));
            let event = AlertEvent::commit(id, alert);
            events.push(event.clone());
            event
        };

        tracing::info!(
            alert_id = %event.id,
            sku = %event.sku,
            kind = %event.kind,
            severity = %event.severity,
            "alert raised"
        );

        self.publish(&event);
        Ok(event)
    }

    fn query(&self, filter: &AlertFilter, order: SortOrder) -> Result<Vec<AlertEvent>, AlertLogError> {
        let events = self.events.read().map_err(|_| AlertLogError::Poisoned)?;
        let matching = events.iter().filter(|e| filter.matches(e)).cloned();

        Ok(match order {
            SortOrder::OldestFirst => matching.collect(),
            SortOrder::NewestFirst => {
                let mut v: Vec<_> = matching.collect();
                v.reverse();
                v
            }
        })
    }

    fn len(&self) -> Result<usize, AlertLogError> {
        Ok(self.events.read().map_err(|_| AlertLogError::Poisoned)?.len())
    }
}

/// Receiving end of an alert subscription.
#[derive(Debug)]
pub struct AlertSubscription {
    rx: Receiver<AlertEvent>,
}

impl AlertSubscription {
    pub fn try_recv(&self) -> Option<AlertEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<AlertEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<AlertEvent> {
        self.rx.try_iter().collect()
    }
}
