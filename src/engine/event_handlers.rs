// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::time::Instant;

use tracing::{debug, info};

use crate::engine::debounce::Debouncer;
use crate::engine::guard::{Admission, CycleGuard};
use crate::engine::{CycleId, CycleSummary, RuntimeOptions, TriggerReason};
use crate::watch::ChangeEvent;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run one full cycle (build, matrix, report).
    StartCycle {
        cycle: CycleId,
        reason: TriggerReason,
    },
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a filtered file change.
///
/// The debouncer decides first; an accepted change then goes through the
/// cycle guard, which either starts a cycle or parks a rerun.
pub fn handle_file_change(
    debouncer: &Debouncer,
    guard: &mut CycleGuard,
    next_cycle: &mut CycleId,
    event: ChangeEvent,
) -> CoreStep {
    if !debouncer.accept(event.at) {
        debug!(path = ?event.path, "change suppressed by debounce window");
        return CoreStep::running(Vec::new());
    }

    info!(path = ?event.path, "change accepted");
    CoreStep::running(admit(guard, next_cycle, TriggerReason::FileWatch))
}

/// Handle a manual cycle request. Bypasses the debounce check but restarts
/// its window, so the burst of writes a build produces does not retrigger.
pub fn handle_cycle_request(
    debouncer: &Debouncer,
    guard: &mut CycleGuard,
    next_cycle: &mut CycleId,
    reason: TriggerReason,
    at: Instant,
) -> CoreStep {
    debouncer.record(at);
    CoreStep::running(admit(guard, next_cycle, reason))
}

/// Handle completion of a cycle.
pub fn handle_cycle_finished(
    guard: &mut CycleGuard,
    options: &RuntimeOptions,
    next_cycle: &mut CycleId,
    summary: CycleSummary,
) -> CoreStep {
    let mut commands = Vec::new();

    if let Some(reason) = guard.finish(summary.cycle) {
        debug!(finished = summary.cycle, "starting pending rerun");
        commands.extend(admit(guard, next_cycle, reason));
    }

    // In `--once` mode, exit when nothing is running or pending.
    let mut keep_running = true;
    if options.exit_when_idle && guard.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

fn admit(guard: &mut CycleGuard, next_cycle: &mut CycleId, reason: TriggerReason) -> Vec<CoreCommand> {
    match guard.offer(reason, *next_cycle) {
        Admission::Start(cycle) => {
            *next_cycle += 1;
            vec![CoreCommand::StartCycle { cycle, reason }]
        }
        Admission::Pending | Admission::Coalesced => Vec::new(),
    }
}
