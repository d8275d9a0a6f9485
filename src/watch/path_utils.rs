// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Return `path` relative to `root`.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. symlinked temp dirs on macOS), we canonicalize both
///   paths and try again.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_path_buf());
        }
    }

    None
}

/// Forward-slash string form of a relative path, for glob matching.
pub fn to_slash_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        let rel = relative_to(Path::new("/proj"), Path::new("/proj/src/main.lua"));
        assert_eq!(rel, Some(PathBuf::from("src/main.lua")));
    }

    #[test]
    fn unrelated_paths_have_no_relative_form() {
        assert_eq!(
            relative_to(Path::new("/proj-does-not-exist"), Path::new("/elsewhere/x")),
            None
        );
    }

    #[test]
    fn slash_form_uses_forward_slashes() {
        assert_eq!(to_slash_string(Path::new("a/b/c.txt")), "a/b/c.txt");
    }
}
