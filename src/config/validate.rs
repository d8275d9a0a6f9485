// src/config/validate.rs

use std::collections::HashSet;
use std::path::{Component, Path};

use globset::Glob;
use regex::Regex;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::config::model::{ConfigFile, ConfigSection, RawConfigFile, Settings, WatchSection};
use crate::errors::{Result, WatchmatrixError};
use crate::matrix::{Flavor, MatrixConfig};
use crate::types::parse_duration;
use crate::watch::filter::normalize_relative;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchmatrixError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let settings = resolve_settings(&raw.config)?;
        validate_watch_section(&raw.watch)?;
        validate_test_template(&raw.test.cmd)?;
        validate_flavors(&raw.flavor)?;
        warn_on_sparse_matrix(&raw);

        let matrix = MatrixConfig {
            template: raw.test.cmd,
            variants: raw.test.variants,
            flavors: raw.flavor,
        };

        Ok(ConfigFile::new_unchecked(settings, raw.watch, raw.build, matrix))
    }
}

fn resolve_settings(cfg: &ConfigSection) -> Result<Settings> {
    let debounce = parse_duration(&cfg.debounce).map_err(|e| {
        WatchmatrixError::ConfigError(format!("[config].debounce: {e}"))
    })?;
    if debounce.is_zero() {
        return Err(WatchmatrixError::ConfigError(
            "[config].debounce must be greater than zero".to_string(),
        ));
    }

    match cfg.max_workers {
        Some(0) => {
            return Err(WatchmatrixError::ConfigError(
                "[config].max_workers must be >= 1 (got 0); omit it for no bound".to_string(),
            ));
        }
        Some(n) if n > Semaphore::MAX_PERMITS => {
            return Err(WatchmatrixError::ConfigError(format!(
                "[config].max_workers must be <= {} (got {n}); omit it for no bound",
                Semaphore::MAX_PERMITS
            )));
        }
        _ => {}
    }

    let task_timeout = match cfg.task_timeout.as_deref() {
        Some(s) => {
            let timeout = parse_duration(s).map_err(|e| {
                WatchmatrixError::ConfigError(format!("[config].task_timeout: {e}"))
            })?;
            if timeout.is_zero() {
                return Err(WatchmatrixError::ConfigError(
                    "[config].task_timeout must be greater than zero".to_string(),
                ));
            }
            Some(timeout)
        }
        None => None,
    };

    Ok(Settings {
        debounce,
        max_workers: cfg.max_workers,
        task_timeout,
        clear_screen: cfg.clear_screen,
        run_on_start: cfg.run_on_start,
    })
}

fn validate_watch_section(watch: &WatchSection) -> Result<()> {
    for dir in &watch.exclude {
        if dir.trim().is_empty() {
            return Err(WatchmatrixError::ConfigError(
                "[watch].exclude entries must not be empty".to_string(),
            ));
        }
        if Path::new(dir).is_absolute() {
            return Err(WatchmatrixError::ConfigError(format!(
                "[watch].exclude entry '{dir}' must be relative to the watch root"
            )));
        }
        let normalized = normalize_relative(dir);
        if normalized.as_os_str().is_empty() {
            return Err(WatchmatrixError::ConfigError(format!(
                "[watch].exclude entry '{dir}' would exclude the whole watch root"
            )));
        }
        if normalized
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(WatchmatrixError::ConfigError(format!(
                "[watch].exclude entry '{dir}' must not leave the watch root"
            )));
        }
    }

    for pat in &watch.ignore {
        Glob::new(pat).map_err(|e| {
            WatchmatrixError::ConfigError(format!("[watch].ignore: invalid glob '{pat}': {e}"))
        })?;
    }

    Ok(())
}

fn validate_test_template(template: &str) -> Result<()> {
    let placeholder = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| WatchmatrixError::Other(e.into()))?;

    for caps in placeholder.captures_iter(template) {
        let name = &caps[1];
        if name != "variant" && name != "suffix" {
            return Err(WatchmatrixError::ConfigError(format!(
                "[test].cmd uses unknown placeholder '{{{name}}}' (expected {{variant}} or {{suffix}})"
            )));
        }
    }

    Ok(())
}

fn validate_flavors(flavors: &[Flavor]) -> Result<()> {
    let mut seen = HashSet::new();
    for flavor in flavors {
        if !seen.insert(flavor.label.as_str()) {
            return Err(WatchmatrixError::ConfigError(format!(
                "duplicate [[flavor]] label '{}'",
                flavor.label
            )));
        }
    }
    Ok(())
}

/// Sparse configs are allowed; they just produce a smaller report.
fn warn_on_sparse_matrix(raw: &RawConfigFile) {
    if raw.flavor.is_empty() {
        warn!("no [[flavor]] entries configured; test matrix is empty");
    } else if raw.test.variants.is_empty() {
        warn!("[test].variants is empty; only flavor headers will be reported");
    } else if raw.test.cmd.trim().is_empty() {
        warn!("[test].cmd is empty; test tasks will run an empty command");
    }
}
