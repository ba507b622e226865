//! Executable lookup with a per-name cache.

use crate::config::SearchPath;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Answers "can `name` be run?" for the dispatcher.
///
/// Answers are memoized by the exact name string for the lifetime of the resolver. A program
/// installed or removed after its first lookup is not noticed unless the entry is dropped
/// with [`Resolver::forget`] or [`Resolver::clear`].
#[derive(Debug, Clone)]
pub struct Resolver {
    search_path: SearchPath,
    cache: HashMap<String, Option<PathBuf>>,
}

impl Resolver {
    pub fn new(search_path: SearchPath) -> Self {
        Self {
            search_path,
            cache: HashMap::new(),
        }
    }

    /// Returns true when `name` is an executable file, either as given or inside one of the
    /// search path directories.
    pub fn resolve(&mut self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Like [`Resolver::resolve`], but returns the file that matched.
    ///
    /// The path is absolute, so a cached answer keeps pointing at the same file after the
    /// working directory changes.
    pub fn locate(&mut self, name: &str) -> Option<&Path> {
        if self.cache.contains_key(name) {
            tracing::trace!(name, "executable cache hit");
        } else {
            let found = probe(&self.search_path, name);
            tracing::debug!(name, found = ?found, "resolved executable");
            self.cache.insert(name.to_owned(), found);
        }
        self.cache.get(name).and_then(|found| found.as_deref())
    }

    /// Drop the cached answer for `name`; the next lookup probes the filesystem again.
    pub fn forget(&mut self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }
}

/// Find the file `name` refers to, as an absolute path.
///
/// A name with a directory component (`./tool`, `bin/tool`, `/usr/bin/env`) is checked as
/// given before the search path. A bare name prefers the search path, the way a shell would
/// run it, and only falls back to an executable of that name in the current directory.
fn probe(search_path: &SearchPath, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let direct = Path::new(name);
    let in_search_path = || {
        search_path
            .dirs()
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    };
    let as_given = || is_executable(direct).then(|| direct.to_path_buf());

    let found = if is_bare(direct) {
        in_search_path().or_else(as_given)
    } else {
        as_given().or_else(in_search_path)
    }?;
    // Relative hits would change meaning after `cd`.
    std::path::absolute(&found).ok()
}

fn is_bare(path: &Path) -> bool {
    path.is_relative() && path.components().count() == 1
}

/// A regular file (after following symlinks) that somebody may execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "exe" | "bat" | "cmd" | "com"))
    }
}
