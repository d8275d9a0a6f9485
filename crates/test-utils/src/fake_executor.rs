use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use watchmatrix::exec::{CapturedOutput, ExecutorBackend};

/// Canned behaviour for one command line.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
    pub delay: Duration,
    /// Fail as if the process could not be spawned.
    pub launch_error: bool,
}

impl Script {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failing(stdout: &str, stderr: &str, code: i32) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn launch_error() -> Self {
        Self {
            launch_error: true,
            ..Self::default()
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A fake executor that:
/// - returns scripted output per command line (unscripted commands echo
///   themselves with exit code 0)
/// - records every captured and inherited invocation
/// - tracks the peak number of concurrently running captured commands.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    scripts: Arc<HashMap<String, Script>>,
    build_code: Option<i32>,
    captured: Arc<Mutex<Vec<String>>>,
    inherited: Arc<Mutex<Vec<String>>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            build_code: Some(0),
            ..Self::default()
        }
    }

    pub fn with_script(mut self, cmd: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(cmd.to_string(), script);
        self
    }

    /// Exit code returned for inherited (build) commands.
    pub fn with_build_code(mut self, code: Option<i32>) -> Self {
        self.build_code = code;
        self
    }

    /// Captured command lines, in start order.
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().unwrap().clone()
    }

    /// Inherited command lines, in start order.
    pub fn inherited(&self) -> Vec<String> {
        self.inherited.lock().unwrap().clone()
    }

    /// Highest number of captured commands observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the running counter even if the future is dropped mid-sleep.
struct RunningGuard(Arc<AtomicUsize>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run_captured(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + '_>> {
        Box::pin(async move {
            self.captured.lock().unwrap().push(cmd.clone());

            let script = self
                .scripts
                .get(&cmd)
                .cloned()
                .unwrap_or_else(|| Script::ok(&format!("{cmd}\n")));

            if script.launch_error {
                return Err(anyhow!("fake spawn failure for `{cmd}`"));
            }

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let _guard = RunningGuard(Arc::clone(&self.running));

            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }

            Ok(CapturedOutput {
                stdout: script.stdout,
                stderr: script.stderr,
                code: script.code,
            })
        })
    }

    fn run_inherited(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            self.inherited.lock().unwrap().push(cmd);
            Ok(self.build_code)
        })
    }
}
