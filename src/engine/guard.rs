// src/engine/guard.rs

//! Single-slot "cycle in progress" guard.
//!
//! Cycles never overlap. A trigger accepted while a cycle runs is parked in
//! one pending slot; further triggers coalesce into it. When the running
//! cycle finishes, the pending trigger (if any) starts the next cycle.

use tracing::debug;

use super::{CycleId, TriggerReason};

#[derive(Debug, Default)]
pub struct CycleGuard {
    running: Option<CycleId>,
    pending: Option<TriggerReason>,
}

/// Result of offering a trigger to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No cycle was running; the caller must start `cycle` now.
    Start(CycleId),
    /// A cycle is running; the trigger now occupies the pending slot.
    Pending,
    /// A cycle is running and a rerun is already pending.
    Coalesced,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    pub fn running(&self) -> Option<CycleId> {
        self.running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Offer a trigger. `next_id` is used only if a cycle starts.
    pub fn offer(&mut self, reason: TriggerReason, next_id: CycleId) -> Admission {
        if self.running.is_none() {
            self.running = Some(next_id);
            return Admission::Start(next_id);
        }

        if self.pending.is_some() {
            debug!(running = ?self.running, "rerun already pending; coalescing trigger");
            return Admission::Coalesced;
        }

        debug!(running = ?self.running, ?reason, "cycle in progress; queuing one rerun");
        self.pending = Some(reason);
        Admission::Pending
    }

    /// Mark `cycle` finished. Returns the pending trigger, which the caller
    /// must start as the next cycle (it is *not* yet marked running).
    pub fn finish(&mut self, cycle: CycleId) -> Option<TriggerReason> {
        if self.running != Some(cycle) {
            debug!(?cycle, running = ?self.running, "finish for a cycle that is not running");
            return None;
        }
        self.running = None;
        self.pending.take()
    }
}
