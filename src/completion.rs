//! `!command` name completion.

use crate::config::ShellConfig;
use crate::resolver::is_executable;
use regex::Regex;
use rustyline::completion::Pair;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::collections::HashSet;
use std::fs;
use std::sync::LazyLock;

/// A lone, possibly empty `!fragment` before the cursor.
static PARTIAL_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!([a-zA-Z][a-zA-Z0-9._-]*)?$").expect("partial command pattern is a valid regex")
});

/// Produces `!name` candidates from builtins, search path executables and, last, the
/// blacklisted host keywords.
#[derive(Debug, Clone)]
pub struct Completer {
    config: ShellConfig,
}

impl Completer {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// Candidates for `fragment`, the text typed after `!`.
    ///
    /// Each candidate appears once. Groups keep their priority order; executables are
    /// sorted within each search path directory.
    pub fn complete(&self, fragment: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |name: &str| {
            let candidate = format!("!{name}");
            if seen.insert(candidate.clone()) {
                out.push(candidate);
            }
        };

        for name in self.config.builtins().filter(|b| b.starts_with(fragment)) {
            push(name);
        }

        for dir in self.config.search_path().dirs() {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            let mut names: Vec<String> = entries
                .flatten()
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.starts_with(fragment))
                .filter(|name| is_executable(&dir.join(name)))
                .collect();
            names.sort();
            for name in &names {
                push(name);
            }
        }

        for name in self.config.blacklist().filter(|k| k.starts_with(fragment)) {
            push(name);
        }

        out
    }
}

/// rustyline integration: completes the first word of a line when it is a `!command`.
pub struct ShellHelper {
    completer: Completer,
}

impl ShellHelper {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            completer: Completer::new(config),
        }
    }
}

impl rustyline::completion::Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before_cursor = &line[..pos];
        if !PARTIAL_COMMAND.is_match(before_cursor) {
            return Ok((pos, Vec::new()));
        }

        let candidates = self
            .completer
            .complete(&before_cursor[1..])
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
