// src/config/mod.rs

//! Configuration loading and validation for watchmatrix.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to built-in defaults
//!   (`loader.rs`).
//! - Validate values and resolve them into typed settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{
    BuildSection, ConfigFile, ConfigSection, RawConfigFile, Settings, TestSection, WatchSection,
};
