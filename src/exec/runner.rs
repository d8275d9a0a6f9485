// src/exec/runner.rs

//! Fan-out/fan-in execution of one cycle's task matrix.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::exec::backend::{CapturedOutput, ExecutorBackend};
use crate::matrix::{SlotIndex, TaskKind, TaskSpec};

/// How a task ended. Display never depends on it; it feeds logs and the
/// per-cycle failure count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Separator entry; nothing was run.
    Info,
    /// Process exited; `None` if it was killed by a signal.
    Exited(Option<i32>),
    /// Process could not be started.
    LaunchFailed,
    /// Process exceeded the configured task timeout and was killed.
    TimedOut,
    /// The worker itself panicked.
    Panicked,
}

/// Outcome of one [`TaskSpec`], bound to the same slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub slot: SlotIndex,
    pub label: String,
    pub stdout: String,
    pub stderr: String,
    pub status: TaskStatus,
}

impl TaskResult {
    fn separator(slot: SlotIndex, label: String) -> Self {
        let stdout = format!("{label}\n");
        Self {
            slot,
            label,
            stdout,
            stderr: String::new(),
            status: TaskStatus::Info,
        }
    }

    fn from_output(slot: SlotIndex, label: String, out: CapturedOutput) -> Self {
        Self {
            slot,
            label,
            stdout: out.stdout,
            stderr: out.stderr,
            status: TaskStatus::Exited(out.code),
        }
    }

    fn failed(slot: SlotIndex, label: String, status: TaskStatus, message: String) -> Self {
        Self {
            slot,
            label,
            stdout: String::new(),
            stderr: message,
            status,
        }
    }

    /// Display text: stdout followed by stderr, verbatim.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        text
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self.status, TaskStatus::Info | TaskStatus::Exited(Some(0)))
    }
}

/// Runs every task of a cycle concurrently and waits for all of them.
///
/// Each task gets its own worker. With `max_workers` set, a semaphore caps
/// how many processes run at once; otherwise the pool is bounded only by the
/// matrix size.
pub struct ConcurrentRunner<E> {
    backend: Arc<E>,
    max_workers: Option<usize>,
    limit: Option<Arc<Semaphore>>,
    task_timeout: Option<Duration>,
}

impl<E> Clone for ConcurrentRunner<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            max_workers: self.max_workers,
            limit: self.limit.clone(),
            task_timeout: self.task_timeout,
        }
    }
}

impl<E> fmt::Debug for ConcurrentRunner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentRunner")
            .field("max_workers", &self.max_workers)
            .field("task_timeout", &self.task_timeout)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend + 'static> ConcurrentRunner<E> {
    pub fn new(
        backend: Arc<E>,
        max_workers: Option<usize>,
        task_timeout: Option<Duration>,
    ) -> Self {
        // Config validation enforces this range; clamp for direct callers.
        let max_workers = max_workers.map(|n| n.clamp(1, Semaphore::MAX_PERMITS));
        Self {
            backend,
            max_workers,
            limit: max_workers.map(|n| Arc::new(Semaphore::new(n))),
            task_timeout,
        }
    }

    pub fn backend(&self) -> &E {
        &self.backend
    }

    /// Configured worker bound; `None` means unbounded.
    pub fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    /// Execute all specs and return one result per spec, in slot order.
    ///
    /// Returns only after every worker has finished.
    pub async fn run_all(&self, specs: Vec<TaskSpec>) -> Vec<TaskResult> {
        let mut workers = Vec::with_capacity(specs.len());

        for spec in specs {
            let slot = spec.slot;
            let label = spec.label.clone();
            let this = self.clone();
            let handle = tokio::spawn(async move { this.run_one(spec).await });
            workers.push((slot, label, handle));
        }

        debug!(workers = workers.len(), "dispatched task workers");

        let mut results = Vec::with_capacity(workers.len());
        for (slot, label, handle) in workers {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(slot, label = %label, error = %err, "task worker panicked");
                    TaskResult::failed(
                        slot,
                        label,
                        TaskStatus::Panicked,
                        format!("task worker failed: {err}\n"),
                    )
                }
            };
            results.push(result);
        }

        results.sort_by_key(|r| r.slot);
        results
    }

    async fn run_one(&self, spec: TaskSpec) -> TaskResult {
        let TaskSpec {
            slot, label, kind, ..
        } = spec;

        let cmd = match kind {
            TaskKind::Separator => return TaskResult::separator(slot, label),
            TaskKind::Command(cmd) => cmd,
        };

        // Held until this function returns.
        let _permit = match &self.limit {
            Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
            None => None,
        };

        debug!(slot, label = %label, cmd = %cmd, "starting test task");

        let run = self.backend.run_captured(cmd.clone());
        let captured = match self.task_timeout {
            Some(limit) => match timeout(limit, run).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(slot, label = %label, ?limit, "task timed out; killed");
                    return TaskResult::failed(
                        slot,
                        label,
                        TaskStatus::TimedOut,
                        format!("`{cmd}` timed out after {limit:?}\n"),
                    );
                }
            },
            None => run.await,
        };

        match captured {
            Ok(out) => {
                debug!(slot, label = %label, exit_code = ?out.code, "test task finished");
                TaskResult::from_output(slot, label, out)
            }
            Err(err) => {
                warn!(slot, label = %label, error = %err, "test task failed to launch");
                TaskResult::failed(
                    slot,
                    label,
                    TaskStatus::LaunchFailed,
                    format!("failed to run `{cmd}`: {err:#}\n"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use anyhow::{anyhow, Result};

    use super::*;
    use crate::matrix::{build_matrix, Flavor, MatrixConfig};

    /// Echoes the command back; `fail` commands fail to launch.
    struct EchoBackend;

    impl ExecutorBackend for EchoBackend {
        fn run_captured(
            &self,
            cmd: String,
        ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + '_>> {
            Box::pin(async move {
                if cmd == "fail" {
                    return Err(anyhow!("no such shell"));
                }
                Ok(CapturedOutput {
                    stdout: format!("{cmd}\n"),
                    stderr: String::new(),
                    code: Some(0),
                })
            })
        }

        fn run_inherited(
            &self,
            _cmd: String,
        ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>> {
            Box::pin(async { Ok(Some(0)) })
        }
    }

    #[tokio::test]
    async fn separators_resolve_to_their_label() {
        let cfg = MatrixConfig {
            template: "run {variant}".to_string(),
            variants: vec!["a".into()],
            flavors: vec![Flavor::new("Dev", "")],
        };
        let runner = ConcurrentRunner::new(Arc::new(EchoBackend), None, None);

        let results = runner.run_all(build_matrix(&cfg)).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text(), "Dev\n");
        assert_eq!(results[0].status, TaskStatus::Info);
        assert_eq!(results[1].text(), "run a\n");
        assert!(!results.iter().any(TaskResult::is_failure));
    }

    #[tokio::test]
    async fn launch_failures_become_result_text() {
        let cfg = MatrixConfig {
            template: "{variant}".to_string(),
            variants: vec!["ok".into(), "fail".into()],
            flavors: vec![Flavor::new("Dev", "")],
        };
        let runner = ConcurrentRunner::new(Arc::new(EchoBackend), Some(1), None);

        let results = runner.run_all(build_matrix(&cfg)).await;

        assert_eq!(results[1].text(), "ok\n");
        assert_eq!(results[2].status, TaskStatus::LaunchFailed);
        assert!(results[2].text().contains("no such shell"));
        assert!(results[2].is_failure());
    }

    #[test]
    fn debug_shows_the_configured_bound() {
        let runner = ConcurrentRunner::new(Arc::new(EchoBackend), Some(3), None);
        assert_eq!(runner.max_workers(), Some(3));
        assert!(format!("{runner:?}").contains("max_workers: Some(3)"));

        let unbounded = ConcurrentRunner::new(Arc::new(EchoBackend), None, None);
        assert!(format!("{unbounded:?}").contains("max_workers: None"));
    }

    #[test]
    fn out_of_range_bounds_are_clamped() {
        let zero = ConcurrentRunner::new(Arc::new(EchoBackend), Some(0), None);
        assert_eq!(zero.max_workers(), Some(1));

        let huge = ConcurrentRunner::new(Arc::new(EchoBackend), Some(usize::MAX), None);
        assert_eq!(huge.max_workers(), Some(Semaphore::MAX_PERMITS));
    }

    #[tokio::test]
    async fn empty_batch_returns_immediately() {
        let runner = ConcurrentRunner::new(Arc::new(EchoBackend), None, None);
        assert!(runner.run_all(Vec::new()).await.is_empty());
    }
}
