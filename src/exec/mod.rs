// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds platform shell commands.
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `RealExecutorBackend` built on `tokio::process::Command`; tests swap in
//!   a fake implementation.
//! - [`runner`] fans a cycle's tasks out to concurrent workers and joins
//!   their results back in slot order.

pub mod backend;
pub mod command;
pub mod runner;

pub use backend::{CapturedOutput, ExecutorBackend, RealExecutorBackend};
pub use runner::{ConcurrentRunner, TaskResult, TaskStatus};
