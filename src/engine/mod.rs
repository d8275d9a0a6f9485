// src/engine/mod.rs

//! Orchestration engine for watchmatrix.
//!
//! This module ties together:
//! - the debouncer (at most one accepted trigger per threshold window)
//! - the single-slot cycle guard (at most one cycle running, at most one
//!   rerun pending)
//! - the cycle orchestrator (build, concurrent matrix, report)
//! - the runtime event loop reacting to file changes, manual requests,
//!   cycle completion and shutdown.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::{Duration, Instant};

use crate::watch::ChangeEvent;

pub use crate::types::TriggerReason;

/// Monotonic cycle number, starting at 1.
pub type CycleId = u64;

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit once a cycle finishes and nothing is pending
    /// (used for `--once`).
    pub exit_when_idle: bool,
}

/// What a finished cycle reports back to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: CycleId,
    pub tasks: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

/// Events flowing into the runtime from the watcher, signal handlers and
/// cycle workers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A filtered file modification.
    FileChanged(ChangeEvent),
    /// Start a cycle regardless of the debounce window.
    CycleRequested {
        reason: TriggerReason,
        at: Instant,
    },
    /// The running cycle printed its report.
    CycleFinished(CycleSummary),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod cycle;
pub mod debounce;
pub mod event_handlers;
pub mod guard;
pub mod runtime;

pub use core::CoreRuntime;
pub use cycle::{CyclePlan, Orchestrator};
pub use debounce::{DebounceState, Debouncer};
pub use event_handlers::{CoreCommand, CoreStep};
pub use guard::CycleGuard;
pub use runtime::Runtime;
