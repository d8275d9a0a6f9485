// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a recursive cross-platform filesystem watcher (`notify`).
//! - Turning raw "modify" notifications into [`ChangeEvent`]s.
//! - Dropping directory events and anything under an excluded subtree
//!   (`.git` by default) or matching an `ignore` glob.
//!
//! It does **not** debounce; that is the engine's job.

pub mod event;
pub mod filter;
pub mod path_utils;
pub mod watcher;

pub use event::ChangeEvent;
pub use filter::ChangeFilter;
pub use watcher::{canonical_root, spawn_watcher, WatcherHandle};
