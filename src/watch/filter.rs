// src/watch/filter.rs

//! Decides which change notifications may reach the debouncer.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{trace, warn};

use crate::config::WatchSection;
use crate::watch::event::ChangeEvent;
use crate::watch::path_utils::{relative_to, to_slash_string};

/// Filter applied to every raw notification.
///
/// An event passes only if it targets a file, lies under the watch root,
/// is outside every excluded subtree, and matches no `ignore` glob.
#[derive(Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    excluded: Vec<PathBuf>,
    ignore_set: Option<GlobSet>,
}

impl fmt::Debug for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFilter")
            .field("root", &self.root)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

impl ChangeFilter {
    pub fn new(root: impl Into<PathBuf>, excluded: &[String], ignore: &[String]) -> Result<Self> {
        let ignore_set = if ignore.is_empty() {
            None
        } else {
            Some(build_globset(ignore).context("building ignore globset")?)
        };

        Ok(Self {
            root: root.into(),
            excluded: excluded.iter().map(|dir| normalize_relative(dir)).collect(),
            ignore_set,
        })
    }

    pub fn from_section(root: impl Into<PathBuf>, section: &WatchSection) -> Result<Self> {
        Self::new(root, &section.exclude, &section.ignore)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if the event should be forwarded to the debouncer.
    pub fn admits(&self, event: &ChangeEvent) -> bool {
        if event.is_dir {
            trace!(path = ?event.path, "ignoring directory event");
            return false;
        }

        let rel = match relative_to(&self.root, &event.path) {
            Some(rel) => rel,
            None => {
                warn!(
                    "could not relativize path {:?} against root {:?}",
                    event.path, self.root
                );
                return false;
            }
        };

        if self.excluded.iter().any(|dir| rel.starts_with(dir)) {
            trace!(path = ?rel, "ignoring event under excluded subtree");
            return false;
        }

        if let Some(ignore) = &self.ignore_set {
            if ignore.is_match(to_slash_string(&rel)) {
                trace!(path = ?rel, "ignoring event matching ignore glob");
                return false;
            }
        }

        true
    }
}

/// Drop `.` components so `./.git` and `.git/` compare equal to `.git`.
pub(crate) fn normalize_relative(dir: &str) -> PathBuf {
    Path::new(dir)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
