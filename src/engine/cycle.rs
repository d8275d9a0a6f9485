// src/engine/cycle.rs

//! One orchestration cycle: header, build, concurrent matrix, report.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::engine::{CycleId, CycleSummary, TriggerReason};
use crate::exec::{ConcurrentRunner, ExecutorBackend, TaskResult};
use crate::matrix::{build_matrix, MatrixConfig};
use crate::report::Reporter;

/// Static per-cycle work, derived once from the config.
#[derive(Debug, Clone, Default)]
pub struct CyclePlan {
    pub build_cmd: Option<String>,
    pub matrix: MatrixConfig,
}

impl CyclePlan {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            build_cmd: cfg.build_cmd().map(str::to_string),
            matrix: cfg.matrix().clone(),
        }
    }
}

/// Runs cycles. Cheap to clone; clones share the runner and reporter.
pub struct Orchestrator<E, W: Write> {
    plan: Arc<CyclePlan>,
    runner: ConcurrentRunner<E>,
    reporter: Arc<Mutex<Reporter<W>>>,
}

impl<E, W: Write> Clone for Orchestrator<E, W> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            runner: self.runner.clone(),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<E, W: Write> std::fmt::Debug for Orchestrator<E, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("plan", &self.plan)
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl<E, W> Orchestrator<E, W>
where
    E: ExecutorBackend + 'static,
    W: Write + Send + 'static,
{
    pub fn new(plan: CyclePlan, runner: ConcurrentRunner<E>, reporter: Reporter<W>) -> Self {
        Self {
            plan: Arc::new(plan),
            runner,
            reporter: Arc::new(Mutex::new(reporter)),
        }
    }

    pub fn plan(&self) -> &CyclePlan {
        &self.plan
    }

    /// Run one cycle to completion. Never fails: subprocess problems end up
    /// in the printed output, console write errors are logged.
    pub async fn run_cycle(&self, cycle: CycleId, reason: TriggerReason) -> CycleSummary {
        let started = Instant::now();
        info!(cycle, ?reason, "cycle started");

        let header = self.lock_reporter().begin_cycle();
        if let Err(err) = header {
            warn!(cycle, error = %err, "failed to write cycle header");
        }

        if let Some(build_cmd) = &self.plan.build_cmd {
            self.run_build(cycle, build_cmd).await;
        }

        let specs = build_matrix(&self.plan.matrix);
        let results = self.runner.run_all(specs).await;

        let report = self.lock_reporter().report(&results);
        if let Err(err) = report {
            warn!(cycle, error = %err, "failed to write cycle report");
        }

        let summary = CycleSummary {
            cycle,
            tasks: results.len(),
            failures: results.iter().filter(|r| r.is_failure()).count(),
            elapsed: started.elapsed(),
        };
        log_failures(cycle, &results);
        info!(
            cycle,
            tasks = summary.tasks,
            failures = summary.failures,
            elapsed = ?summary.elapsed,
            "cycle finished"
        );
        summary
    }

    /// The build's exit status never gates the test matrix.
    async fn run_build(&self, cycle: CycleId, build_cmd: &str) {
        match self.runner.backend().run_inherited(build_cmd.to_string()).await {
            Ok(Some(0)) => info!(cycle, "build step succeeded"),
            Ok(code) => warn!(cycle, exit_code = ?code, "build step failed; running tests anyway"),
            Err(err) => warn!(cycle, error = %err, "build step could not run; running tests anyway"),
        }
    }

    fn lock_reporter(&self) -> std::sync::MutexGuard<'_, Reporter<W>> {
        self.reporter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_failures(cycle: CycleId, results: &[TaskResult]) {
    for result in results.iter().filter(|r| r.is_failure()) {
        info!(
            cycle,
            slot = result.slot,
            label = %result.label,
            status = ?result.status,
            "task did not succeed"
        );
    }
}
