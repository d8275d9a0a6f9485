// src/logging.rs

//! Logging setup for `watchmatrix` using `tracing` + `tracing-subscriber`.
//!
//! Filter priority:
//! 1. `--log-level` CLI flag (a plain level for every target)
//! 2. `WATCHMATRIX_LOG`, any `EnvFilter` directive string such as
//!    `"debug"` or `"info,watchmatrix::exec=trace"`
//! 3. `info`
//!
//! Logs go to stderr; the cycle report owns stdout.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "WATCHMATRIX_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => filter_from_env(std::env::var(LOG_ENV_VAR).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

/// Unset, blank or unparsable values fall back to `info`.
fn filter_from_env(value: Option<&str>) -> EnvFilter {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directives_pass_through() {
        let filter = filter_from_env(Some("warn,watchmatrix::exec=trace"));
        let rendered = filter.to_string();
        assert!(rendered.contains("watchmatrix::exec=trace"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn missing_or_blank_env_falls_back_to_info() {
        assert_eq!(filter_from_env(None).to_string(), "info");
        assert_eq!(filter_from_env(Some("  ")).to_string(), "info");
    }

    #[test]
    fn cli_levels_map_to_directives() {
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
        assert_eq!(LogLevel::Error.as_directive(), "error");
    }
}
