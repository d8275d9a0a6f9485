// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::cycle::Orchestrator;
use super::{CoreCommand, CycleId, RuntimeEvent, TriggerReason};

/// Drives the core in response to `RuntimeEvent`s and runs the cycles it
/// asks for.
///
/// Each cycle runs in its own Tokio task and reports back through
/// `RuntimeEvent::CycleFinished`, so the loop keeps receiving (and
/// debouncing) file changes while a cycle is in progress.
pub struct Runtime<E, W: Write> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    orchestrator: Orchestrator<E, W>,
}

impl<E, W: Write> fmt::Debug for Runtime<E, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E, W> Runtime<E, W>
where
    E: ExecutorBackend + 'static,
    W: Write + Send + 'static,
{
    /// `event_tx` must feed `event_rx`; finished cycles report through it.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        orchestrator: Orchestrator<E, W>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            orchestrator,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (start cycle, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("watchmatrix runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StartCycle { cycle, reason } => self.spawn_cycle(cycle, reason),
            CoreCommand::RequestExit => {
                // keep_running=false already ends the loop.
                info!("core issued RequestExit command");
            }
        }
    }

    fn spawn_cycle(&self, cycle: CycleId, reason: TriggerReason) {
        let orchestrator = self.orchestrator.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let summary = orchestrator.run_cycle(cycle, reason).await;
            if let Err(err) = tx.send(RuntimeEvent::CycleFinished(summary)).await {
                warn!(cycle, "failed to report cycle completion: {err}");
            }
        });
    }
}
