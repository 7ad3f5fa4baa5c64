// McNotify - core/debounce.rs
//
// Debounce policy: suppress a repeated (kind, player) event while it falls
// inside the window that started at the last *allowed* occurrence.
//
// Core layer: no I/O. The clock is injected through `allow_at` so the
// policy is testable without sleeping.
//
// Single-writer: the owning `Dispatcher` lives on the tailer thread and
// takes `&mut self`, so no lock guards the map. The map grows with every
// distinct player name for the lifetime of the process.

use crate::core::model::{EventKind, PlayerEvent};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Debounce key: event kind plus the lower-cased player name.
pub type DebounceKey = (EventKind, String);

/// Sliding-window suppression of repeated events.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_allowed: HashMap<DebounceKey, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_allowed: HashMap::new(),
        }
    }

    /// Decide whether `event` may proceed, using the current time.
    pub fn allow(&mut self, event: &PlayerEvent) -> bool {
        self.allow_at(event, Instant::now())
    }

    /// Decide whether `event` may proceed at time `now`.
    ///
    /// Allowed when the key has never been allowed before, or at least
    /// `window` has elapsed since it last was. An allowed event records
    /// `now`; a suppressed one leaves the stored time untouched.
    pub fn allow_at(&mut self, event: &PlayerEvent, now: Instant) -> bool {
        let key = (event.kind(), event.player().to_lowercase());

        if let Some(last) = self.last_allowed.get(&key) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        self.last_allowed.insert(key, now);
        true
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.last_allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_allowed.is_empty()
    }
}
