// McNotify - app/dispatch.rs
//
// Debounced dispatcher: the tailer's event callback. Filters repeated
// (kind, player) events through the `Debouncer` and hands the survivors to
// the delivery queue.
//
// Runs synchronously on the tailer thread. Enqueueing uses `try_send` on a
// bounded tokio channel, so the tailer never blocks on delivery: when the
// queue is full or closed the event is dropped.

use crate::core::debounce::Debouncer;
use crate::core::model::PlayerEvent;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Accepted by the delivery queue.
    Queued,
    /// Suppressed by the debounce window.
    Debounced,
    /// Allowed, but the queue was full or closed.
    Dropped,
}

/// Owns the debounce map and the producer side of the delivery queue.
pub struct Dispatcher {
    debouncer: Debouncer,
    tx: mpsc::Sender<PlayerEvent>,
}

impl Dispatcher {
    pub fn new(debounce_window: Duration, tx: mpsc::Sender<PlayerEvent>) -> Self {
        Self {
            debouncer: Debouncer::new(debounce_window),
            tx,
        }
    }

    /// Debounce `event` and enqueue it without blocking.
    pub fn dispatch(&mut self, event: PlayerEvent) -> DispatchOutcome {
        if !self.debouncer.allow(&event) {
            tracing::debug!(kind = %event.kind(), player = event.player(), "Debounced duplicate event");
            return DispatchOutcome::Debounced;
        }

        match self.tx.try_send(event) {
            Ok(()) => DispatchOutcome::Queued,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    kind = %event.kind(),
                    player = event.player(),
                    "Delivery queue full; dropping event"
                );
                DispatchOutcome::Dropped
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(
                    kind = %event.kind(),
                    player = event.player(),
                    "Delivery queue closed; dropping event"
                );
                DispatchOutcome::Dropped
            }
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}
