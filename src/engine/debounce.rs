// src/engine/debounce.rs

//! Trailing-edge debounce keyed on the last *accepted* trigger.
//!
//! Editors often emit several notifications per save. Events closer than
//! `threshold` to the last accepted cycle start are dropped; because the
//! window restarts only on acceptance, a continuous stream of edits still
//! triggers one cycle per threshold interval.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

/// Timestamp of the last accepted cycle start.
///
/// `None` is the "epoch": nothing accepted yet, so the first event always
/// passes. Compare-and-update happens under a single lock acquisition.
#[derive(Debug, Default)]
pub struct DebounceState {
    last_accepted: Mutex<Option<Instant>>,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        *self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: Duration,
    state: Arc<DebounceState>,
}

impl Debouncer {
    pub fn new(threshold: Duration, state: Arc<DebounceState>) -> Self {
        Self { threshold, state }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn state(&self) -> &Arc<DebounceState> {
        &self.state
    }

    /// Decide whether an event observed at `at` starts a new cycle.
    ///
    /// On acceptance `at` becomes the new window start.
    pub fn accept(&self, at: Instant) -> bool {
        let mut last = self
            .state
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = *last {
            let since = at.saturating_duration_since(prev);
            if since < self.threshold {
                trace!(?since, threshold = ?self.threshold, "debounced");
                return false;
            }
        }

        *last = Some(at);
        true
    }

    /// Unconditionally start a new window at `at` (manual triggers).
    pub fn record(&self, at: Instant) {
        *self
            .state
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(at);
    }
}
