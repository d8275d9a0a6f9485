// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runner and the cycle orchestrator talk to an `ExecutorBackend`
//! instead of spawning processes directly. Production uses
//! [`RealExecutorBackend`]; tests provide scripted implementations that
//! return canned output, with delays to force out-of-order completion.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::command::shell_command;

/// Fully captured output of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait abstracting how commands are executed.
pub trait ExecutorBackend: Send + Sync {
    /// Run `cmd` with stdout/stderr captured in full; resolves after exit.
    ///
    /// Errors mean the process could not be started or waited on. A process
    /// that runs and fails is an `Ok` with a non-zero code.
    fn run_captured(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + '_>>;

    /// Run `cmd` with stdio inherited from this process and return its exit
    /// code once it finishes.
    fn run_inherited(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>>;
}

/// Real executor backend used in production.
#[derive(Debug, Clone, Default)]
pub struct RealExecutorBackend;

impl RealExecutorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn run_captured(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + '_>> {
        Box::pin(async move {
            debug!(cmd = %cmd, "spawning captured process");

            // kill_on_drop: a timed-out task drops this future, which must
            // take the child down with it.
            let output = shell_command(&cmd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| format!("spawning process for `{cmd}`"))?;

            let captured = CapturedOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                code: output.status.code(),
            };

            debug!(
                cmd = %cmd,
                exit_code = ?captured.code,
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "captured process exited"
            );

            Ok(captured)
        })
    }

    fn run_inherited(
        &self,
        cmd: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            info!(cmd = %cmd, "running build step");

            let status = shell_command(&cmd)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .status()
                .await
                .with_context(|| format!("running build command `{cmd}`"))?;

            Ok(status.code())
        })
    }
}
