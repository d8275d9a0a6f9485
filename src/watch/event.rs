// src/watch/event.rs

use std::path::PathBuf;
use std::time::Instant;

/// One filesystem modification notification.
///
/// Created by the watcher for every raw notification and discarded right
/// after filtering and debouncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub is_dir: bool,
    pub at: Instant,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, is_dir: bool, at: Instant) -> Self {
        Self {
            path: path.into(),
            is_dir,
            at,
        }
    }

    /// A file (non-directory) event observed now.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false, Instant::now())
    }
}
