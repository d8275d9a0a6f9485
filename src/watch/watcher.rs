// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::watch::event::ChangeEvent;
use crate::watch::filter::ChangeFilter;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping the handle
/// stops watching; [`WatcherHandle::stop`] does so explicitly.
pub struct WatcherHandle {
    inner: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Unsubscribe from the watched tree and release the watcher.
    pub fn stop(mut self) {
        if let Err(err) = self.inner.unwatch(&self.root) {
            warn!(error = %err, "failed to unwatch root cleanly");
        }
        info!(root = ?self.root, "file watcher stopped");
    }
}

/// Spawn a filesystem watcher that observes the filter's root recursively
/// and sends `RuntimeEvent::FileChanged` for every modification the filter
/// admits.
///
/// Failing to attach the watch is returned as an error; callers treat it as
/// fatal.
pub fn spawn_watcher(
    filter: ChangeFilter,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = filter.root().to_path_buf();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<(Event, Instant)>();

    // Called synchronously on notify's thread; stamp the arrival time here so
    // debouncing sees when the change happened, not when it was dequeued.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send((event, Instant::now())) {
                    eprintln!("watchmatrix: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("watchmatrix: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some((event, at)) = event_rx.recv().await {
            debug!(?event, "received notify event");

            if !matches!(event.kind, EventKind::Modify(_)) {
                continue;
            }

            for path in event.paths {
                let is_dir = path.is_dir();
                let change = ChangeEvent::new(path, is_dir, at);
                if !filter.admits(&change) {
                    continue;
                }

                if let Err(err) = runtime_tx.send(RuntimeEvent::FileChanged(change)).await {
                    warn!("failed to send RuntimeEvent::FileChanged: {err}");
                    // Runtime is gone; nothing left to notify.
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        inner: watcher,
        root,
    })
}

/// Canonicalize the watch root once so relative paths are stable.
pub fn canonical_root(root: impl Into<PathBuf>) -> Result<PathBuf> {
    let root = root.into();
    let canon = root
        .canonicalize()
        .with_context(|| format!("watch root {:?} is not accessible", root))?;
    Ok(canon)
}
