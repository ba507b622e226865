//! Immutable configuration shared by the dispatcher and the completion provider.

use crate::builtin::Builtin;
use std::collections::BTreeSet;
use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Names that collide with reserved constructs of the host language.
///
/// A `!name` line whose command is listed here is always handed back to the host, even when
/// an executable of the same name exists.
pub const BLACKLIST: &[&str] = &[
    "[", "ap", "begin", "case", "class", "def", "fail", "false", "for", "if", "lambda", "load",
    "loop", "module", "p", "pp", "print", "proc", "puts", "raise", "require", "true", "undef",
    "unless", "until", "warn", "while",
];

/// Ordered list of directories searched for executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Split a `PATH`-style value using the platform separator.
    pub fn parse(value: &OsStr) -> Self {
        Self {
            dirs: stdenv::split_paths(value).collect(),
        }
    }

    /// Read `PATH` from the process environment. An unset variable gives an empty path.
    pub fn from_env() -> Self {
        stdenv::var_os("PATH")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Join the directories back into a `PATH`-style value.
    pub fn to_os_string(&self) -> OsString {
        stdenv::join_paths(&self.dirs).unwrap_or_default()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            dirs: iter.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }
}

/// Everything the dispatcher needs to know up front.
///
/// Built once at startup; the search path is never re-read afterwards.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    search_path: SearchPath,
    blacklist: BTreeSet<&'static str>,
    command_timeout: Option<Duration>,
}

impl ShellConfig {
    pub fn new(search_path: SearchPath) -> Self {
        Self {
            search_path,
            blacklist: BLACKLIST.iter().copied().collect(),
            command_timeout: None,
        }
    }

    /// Configuration for the current process, with the search path taken from `PATH`.
    pub fn from_env() -> Self {
        Self::new(SearchPath::from_env())
    }

    /// Kill external commands that run longer than `timeout`.
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }

    pub fn blacklist(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.blacklist.iter().copied()
    }

    pub fn builtin(&self, name: &str) -> Option<Builtin> {
        Builtin::from_name(name)
    }

    pub fn builtins(&self) -> impl Iterator<Item = &'static str> {
        Builtin::ALL.iter().map(|b| b.name())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
