// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchmatrix`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchmatrix",
    version,
    about = "Rebuild and run a test matrix whenever project files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If the default `Watchmatrix.toml` does not exist, built-in defaults
    /// are used instead.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Directory to watch. Overrides `[watch].root`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Run a single cycle immediately, without watching, then exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHMATRIX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task matrix, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
