//! Routing of `!command` lines.

use crate::command::{Outcome, ParsedCommand};
use crate::config::ShellConfig;
use crate::env::{Environment, ProcessEnvironment};
use crate::error::ShellError;
use crate::eval::Evaluator;
use crate::external::ExternalCommand;
use crate::parser;
use crate::resolver::Resolver;
use regex::Regex;
use std::io::{self, Write};
use std::sync::LazyLock;

/// `!` followed by something that looks like a command name, anchored at the first byte.
const COMMAND_PATTERN: &str = r"^![a-zA-Z][a-zA-Z0-9._-]*";

static COMMAND_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COMMAND_PATTERN).expect("command pattern is a valid regex"));

/// Whether `line` is a candidate shell command at all.
///
/// Leading whitespace disqualifies a line, as does a name starting with a digit or
/// punctuation.
pub fn is_command_line(line: &str) -> bool {
    COMMAND_LINE.is_match(line)
}

/// Routes `!command` lines to builtins or external programs.
///
/// The dispatcher owns the executable cache and the environment it mutates. A host REPL
/// creates one at startup and calls [`Dispatcher::dispatch`] for every line it reads.
///
/// Example
/// ```
/// use repl_shell_commands::{Bindings, Dispatcher, Outcome, ShellConfig};
/// let mut sh = Dispatcher::new(ShellConfig::from_env());
/// let outcome = sh.dispatch("1 + 1", false, &mut Bindings::default()).unwrap();
/// assert_eq!(outcome, Outcome::NotRecognized);
/// ```
pub struct Dispatcher {
    config: ShellConfig,
    resolver: Resolver,
    env: Box<dyn Environment>,
    stderr: Box<dyn Write>,
}

impl Dispatcher {
    /// Create a dispatcher acting on the real process environment.
    pub fn new(config: ShellConfig) -> Self {
        Self {
            resolver: Resolver::new(config.search_path().clone()),
            config,
            env: Box::new(ProcessEnvironment),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Replace the environment builtins read and write.
    pub fn with_environment(mut self, env: Box<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Replace where builtin warnings are written.
    pub fn with_stderr(mut self, stderr: Box<dyn Write>) -> Self {
        self.stderr = stderr;
        self
    }

    /// The configuration this dispatcher was created with.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The executable cache, e.g. to [`Resolver::forget`] a name after installing it.
    pub fn resolver(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// Handle one line of host input.
    ///
    /// `in_buffer` must be true while the host is collecting a multi-line expression; such
    /// lines are never treated as commands. Parse and evaluation failures are returned as
    /// errors. Everything else, including failing commands, is an [`Outcome`].
    ///
    /// # Arguments
    /// * `line` - One complete line as typed, without the trailing newline.
    /// * `in_buffer` - Whether the host is in the middle of a multi-line expression.
    /// * `evaluator` - Computes the value of each `#{...}` expression.
    ///
    /// # Returns
    /// [`Outcome::NotRecognized`] when the host should evaluate the line itself, otherwise
    /// [`Outcome::Handled`] with the command's success.
    pub fn dispatch(
        &mut self,
        line: &str,
        in_buffer: bool,
        evaluator: &mut dyn Evaluator,
    ) -> Result<Outcome, ShellError> {
        if in_buffer || !is_command_line(line) {
            tracing::trace!(in_buffer, "line is not a shell command");
            return Ok(Outcome::NotRecognized);
        }

        let command = parser::parse(&line[1..], evaluator)?;
        Ok(self.run(&command))
    }

    /// Run an already parsed command.
    ///
    /// Blacklisted names come first and are never run, then builtins, then executables
    /// found by the resolver. A name matching none of these is [`Outcome::NotRecognized`].
    pub fn run(&mut self, command: &ParsedCommand) -> Outcome {
        let name = command.name.as_str();

        if self.config.is_blacklisted(name) {
            tracing::debug!(name, "blacklisted; leaving line to the host");
            return Outcome::NotRecognized;
        }

        if let Some(builtin) = self.config.builtin(name) {
            tracing::debug!(name, args = ?command.arguments, "running builtin");
            let ok = builtin.execute(
                &command.arguments,
                self.env.as_mut(),
                self.stderr.as_mut(),
            );
            return Outcome::Handled(ok);
        }

        let timeout = self.config.command_timeout();
        match self.resolver.locate(name) {
            Some(program) => {
                tracing::debug!(
                    name,
                    program = %program.display(),
                    args = ?command.arguments,
                    "running external command"
                );
                let ok = ExternalCommand::new(name, program, &command.arguments).execute(timeout);
                Outcome::Handled(ok)
            }
            None => {
                tracing::debug!(name, "unknown command; leaving line to the host");
                Outcome::NotRecognized
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ShellConfig::from_env())
    }
}
