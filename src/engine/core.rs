// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) reads events from channels,
//! spawns cycles and handles shutdown. The core has no Tokio types and
//! performs no IO, so it is tested with plain `Instant` arithmetic.

use crate::engine::debounce::Debouncer;
use crate::engine::event_handlers::{
    handle_cycle_finished, handle_cycle_request, handle_file_change, CoreStep,
};
use crate::engine::guard::CycleGuard;
use crate::engine::{CycleId, RuntimeEvent, RuntimeOptions};

#[derive(Debug)]
pub struct CoreRuntime {
    debouncer: Debouncer,
    guard: CycleGuard,
    options: RuntimeOptions,
    next_cycle: CycleId,
}

impl CoreRuntime {
    pub fn new(debouncer: Debouncer, options: RuntimeOptions) -> Self {
        Self {
            debouncer,
            guard: CycleGuard::new(),
            options,
            next_cycle: 1,
        }
    }

    /// Expose whether a cycle is running (for tests).
    pub fn is_idle(&self) -> bool {
        self.guard.is_idle()
    }

    /// Expose whether a rerun is pending (for tests).
    pub fn has_pending(&self) -> bool {
        self.guard.has_pending()
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::FileChanged(change) => handle_file_change(
                &self.debouncer,
                &mut self.guard,
                &mut self.next_cycle,
                change,
            ),
            RuntimeEvent::CycleRequested { reason, at } => handle_cycle_request(
                &self.debouncer,
                &mut self.guard,
                &mut self.next_cycle,
                reason,
                at,
            ),
            RuntimeEvent::CycleFinished(summary) => handle_cycle_finished(
                &mut self.guard,
                &self.options,
                &mut self.next_cycle,
                summary,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::engine::event_handlers::CoreCommand;
    use crate::engine::{CycleSummary, DebounceState, TriggerReason};
    use crate::watch::ChangeEvent;

    fn core(exit_when_idle: bool) -> CoreRuntime {
        let debouncer = Debouncer::new(Duration::from_secs(1), Arc::new(DebounceState::new()));
        CoreRuntime::new(debouncer, RuntimeOptions { exit_when_idle })
    }

    fn change_at(at: Instant) -> RuntimeEvent {
        RuntimeEvent::FileChanged(ChangeEvent::new("/proj/src/a.lua", false, at))
    }

    fn finished(cycle: CycleId) -> RuntimeEvent {
        RuntimeEvent::CycleFinished(CycleSummary {
            cycle,
            tasks: 8,
            failures: 0,
            elapsed: Duration::from_millis(10),
        })
    }

    fn started(step: &CoreStep) -> Vec<CycleId> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::StartCycle { cycle, .. } => Some(*cycle),
                CoreCommand::RequestExit => None,
            })
            .collect()
    }

    #[test]
    fn events_half_a_second_apart_start_one_cycle() {
        let mut core = core(false);
        let t0 = Instant::now();

        let a = core.step(change_at(t0));
        assert_eq!(started(&a), vec![1]);
        core.step(finished(1));

        let b = core.step(change_at(t0 + Duration::from_millis(500)));
        assert!(started(&b).is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn events_one_and_a_half_seconds_apart_start_two_cycles() {
        let mut core = core(false);
        let t0 = Instant::now();

        assert_eq!(started(&core.step(change_at(t0))), vec![1]);
        core.step(finished(1));
        assert_eq!(
            started(&core.step(change_at(t0 + Duration::from_millis(1500)))),
            vec![2]
        );
    }

    #[test]
    fn accepted_change_during_cycle_runs_once_afterwards() {
        let mut core = core(false);
        let t0 = Instant::now();

        core.step(change_at(t0));
        // Outside the window but while cycle 1 still runs.
        assert!(started(&core.step(change_at(t0 + Duration::from_secs(2)))).is_empty());
        assert!(started(&core.step(change_at(t0 + Duration::from_secs(4)))).is_empty());
        assert!(core.has_pending());

        let step = core.step(finished(1));
        assert_eq!(started(&step), vec![2]);
        assert!(!core.has_pending());

        let step = core.step(finished(2));
        assert!(started(&step).is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn manual_request_bypasses_debounce() {
        let mut core = core(false);
        let t0 = Instant::now();

        core.step(change_at(t0));
        core.step(finished(1));

        let step = core.step(RuntimeEvent::CycleRequested {
            reason: TriggerReason::Manual,
            at: t0 + Duration::from_millis(100),
        });
        assert_eq!(started(&step), vec![2]);
    }

    #[test]
    fn once_mode_exits_after_the_cycle() {
        let mut core = core(true);

        core.step(RuntimeEvent::CycleRequested {
            reason: TriggerReason::Manual,
            at: Instant::now(),
        });
        let step = core.step(finished(1));

        assert!(!step.keep_running);
        assert!(step.commands.contains(&CoreCommand::RequestExit));
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = core(false);
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
