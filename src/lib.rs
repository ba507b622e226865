//! Shell commands for interactive read-eval-print loops.
//!
//! Lines typed into a host REPL that start with `!` followed by a command name are routed
//! here instead of to the host's expression evaluator. The crate decides whether the name is
//! reserved by the host (and must be left alone), one of the in-process builtins (`cd`,
//! `export`), or an executable on the search path, and runs it with shell-like quoting.
//! Embedded `#{...}` expressions are evaluated by the host before the command is tokenized.
//!
//! The host owns the loop. It calls [`Dispatcher::dispatch`] for every complete line and
//! falls back to its own evaluation when the answer is [`Outcome::NotRecognized`]:
//!
//! ```no_run
//! use repl_shell_commands::{Bindings, Dispatcher, Outcome, ShellConfig};
//!
//! let mut dispatcher = Dispatcher::new(ShellConfig::from_env());
//! let mut bindings = Bindings::default();
//! bindings.set("x", "42");
//!
//! match dispatcher.dispatch("!echo #{x}", false, &mut bindings) {
//!     Ok(Outcome::Handled(ok)) => println!("shell command finished, success = {ok}"),
//!     Ok(Outcome::NotRecognized) => { /* evaluate the line as an expression */ }
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod builtin;
pub mod command;
pub mod completion;
pub mod config;
mod dispatcher;
pub mod env;
pub mod error;
pub mod eval;
mod external;
mod lexer;
mod parser;
pub mod resolver;

pub use builtin::Builtin;
pub use command::{Outcome, ParsedCommand};
pub use completion::{Completer, ShellHelper};
pub use config::{SearchPath, ShellConfig};
pub use dispatcher::{Dispatcher, is_command_line};
pub use env::{Environment, ProcessEnvironment};
pub use error::{EvaluationError, ParseError, ShellError};
pub use eval::{Bindings, Evaluator};
pub use parser::parse;
pub use resolver::Resolver;
