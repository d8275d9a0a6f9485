// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to
/// also resolve durations and check templates.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config path: `Watchmatrix.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Watchmatrix.toml")
}

/// Resolve the configuration to use.
///
/// - An explicit path must exist and be valid.
/// - Without one, `Watchmatrix.toml` is used if present.
/// - Otherwise the built-in matrix applies.
///
/// Returns the config together with the file it came from, if any.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(ConfigFile, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let cfg = load_and_validate(path)?;
        return Ok((cfg, Some(path.to_path_buf())));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        let cfg = load_and_validate(&default_path)?;
        return Ok((cfg, Some(default_path)));
    }

    info!(
        path = %default_path.display(),
        "no config file found; using built-in defaults"
    );
    let cfg = ConfigFile::try_from(RawConfigFile::builtin())?;
    Ok((cfg, None))
}
