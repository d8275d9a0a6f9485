// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod matrix;
pub mod report;
pub mod types;
pub mod watch;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile};
use crate::engine::{
    CoreRuntime, CyclePlan, DebounceState, Debouncer, Orchestrator, Runtime, RuntimeEvent,
    RuntimeOptions, TriggerReason,
};
use crate::exec::{ConcurrentRunner, RealExecutorBackend};
use crate::matrix::build_matrix;
use crate::report::Reporter;
use crate::watch::{canonical_root, spawn_watcher, ChangeFilter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution
/// - executor, runner and reporter
/// - core + runtime
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let explicit = args.config.as_deref().map(Path::new);
    let (cfg, config_path) = resolve_config(explicit)?;

    if args.dry_run {
        let mut stdout = std::io::stdout().lock();
        write_dry_run(&mut stdout, &cfg, config_path.as_deref())?;
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    let settings = *cfg.settings();

    let backend = Arc::new(RealExecutorBackend::new());
    let runner = ConcurrentRunner::new(backend, settings.max_workers, settings.task_timeout);
    let reporter = Reporter::stdout(settings.clear_screen);
    let orchestrator = Orchestrator::new(CyclePlan::from_config(&cfg), runner, reporter);

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Optional file watcher (disabled in --once mode).
    let watcher_handle = if !args.once {
        let root = canonical_root(resolve_watch_root(
            args.root.as_deref(),
            cfg.watch_section().root.as_deref(),
            config_path.as_deref(),
            &current_dir(),
        ))?;
        let filter = ChangeFilter::from_section(root, cfg.watch_section())?;
        Some(spawn_watcher(filter, rt_tx.clone())?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    if args.once || settings.run_on_start {
        info!(once = args.once, "requesting initial cycle");
        rt_tx
            .send(RuntimeEvent::CycleRequested {
                reason: TriggerReason::Manual,
                at: Instant::now(),
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let debouncer = Debouncer::new(settings.debounce, Arc::new(DebounceState::new()));
    let core = CoreRuntime::new(debouncer, options);

    let runtime = Runtime::new(core, rt_rx, rt_tx, orchestrator);
    let outcome = runtime.run().await;

    if let Some(handle) = watcher_handle {
        handle.stop();
    }

    Ok(outcome?)
}

/// Pick the directory to watch.
///
/// Priority: `--root`, then `[watch].root` (relative to the config file's
/// directory), then the config file's directory, then `cwd`.
fn resolve_watch_root(
    cli_root: Option<&str>,
    section_root: Option<&str>,
    config_path: Option<&Path>,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = cli_root {
        return PathBuf::from(root);
    }

    let base = match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd.to_path_buf(),
    };

    match section_root {
        Some(root) => base.join(root),
        None => base,
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Write the resolved configuration and the task matrix one cycle would run.
fn write_dry_run<W: Write>(
    out: &mut W,
    cfg: &ConfigFile,
    config_path: Option<&Path>,
) -> std::io::Result<()> {
    let settings = cfg.settings();
    let watch = cfg.watch_section();

    writeln!(out, "watchmatrix dry-run")?;
    match config_path {
        Some(path) => writeln!(out, "  config file = {}", path.display())?,
        None => writeln!(out, "  config file = (built-in defaults)")?,
    }
    writeln!(out, "  debounce = {:?}", settings.debounce)?;
    match settings.max_workers {
        Some(n) => writeln!(out, "  max_workers = {n}")?,
        None => writeln!(out, "  max_workers = unbounded")?,
    }
    if let Some(limit) = settings.task_timeout {
        writeln!(out, "  task_timeout = {limit:?}")?;
    }
    writeln!(out, "  clear_screen = {}", settings.clear_screen)?;
    writeln!(out, "  run_on_start = {}", settings.run_on_start)?;
    writeln!(out, "  watch.exclude = {:?}", watch.exclude)?;
    if !watch.ignore.is_empty() {
        writeln!(out, "  watch.ignore = {:?}", watch.ignore)?;
    }
    writeln!(out)?;

    match cfg.build_cmd() {
        Some(cmd) => writeln!(out, "build: {cmd}")?,
        None => writeln!(out, "build: (none)")?,
    }
    writeln!(out)?;

    let specs = build_matrix(cfg.matrix());
    writeln!(out, "matrix ({} tasks):", specs.len())?;
    for spec in &specs {
        match spec.command() {
            Some(cmd) => writeln!(out, "  [{}]   {} -> {}", spec.slot, spec.label, cmd)?,
            None => writeln!(out, "  [{}] {}", spec.slot, spec.label)?,
        }
    }

    out.flush()
}
