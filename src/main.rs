use anyhow::{Context, Result};
use argh::FromArgs;
use repl_shell_commands::{Bindings, Dispatcher, Outcome, ShellConfig, ShellHelper};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Minimal interactive host: `name = value` binds a variable, `name` prints it, and lines
/// starting with `!` run as shell commands with `#{name}` substitution.
struct Args {
    #[argh(switch, short = 'v')]
    /// log dispatcher decisions to standard error.
    verbose: bool,

    #[argh(option)]
    /// kill external commands that run longer than this many seconds.
    timeout: Option<f64>,

    #[argh(option, short = 'c')]
    /// run a single line and exit with its status.
    command: Option<String>,
}

/// The host side of the composition: it owns the read loop and its own tiny expression
/// language, and asks the dispatcher first.
struct Host {
    dispatcher: Dispatcher,
    bindings: Bindings,
    /// Lines collected while an expression continues with a trailing `\`.
    buffer: Option<String>,
}

impl Host {
    fn new(config: ShellConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
            bindings: Bindings::default(),
            buffer: None,
        }
    }

    /// Returns whether the line succeeded.
    fn handle_line(&mut self, line: &str) -> bool {
        match self
            .dispatcher
            .dispatch(line, self.buffer.is_some(), &mut self.bindings)
        {
            Ok(Outcome::Handled(ok)) => return ok,
            Ok(Outcome::NotRecognized) => {}
            Err(e) => {
                eprintln!("{e}");
                return false;
            }
        }

        let mut text = self.buffer.take().unwrap_or_default();
        match line.strip_suffix('\\') {
            Some(head) => {
                text.push_str(head);
                text.push('\n');
                self.buffer = Some(text);
                true
            }
            None => {
                text.push_str(line);
                self.evaluate(&text)
            }
        }
    }

    fn evaluate(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return true;
        }
        if let Some((name, value)) = text.split_once('=') {
            let name = name.trim();
            if !is_identifier(name) {
                eprintln!("invalid variable name `{name}`");
                return false;
            }
            let value = value.trim();
            println!("{name} = {value}");
            self.bindings.set(name, value);
            return true;
        }
        match self.bindings.get(text) {
            Some(value) => {
                println!("{value}");
                true
            }
            None => {
                eprintln!("undefined variable `{text}`");
                false
            }
        }
    }

    fn repl(&mut self, config: ShellConfig) -> Result<()> {
        let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(ShellHelper::new(config)));

        loop {
            let prompt = if self.buffer.is_some() { ".. " } else { ">> " };
            match rl.readline(prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    self.handle_line(&line);
                }
                Err(ReadlineError::Interrupted) => {
                    self.buffer = None;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let timeout = args
        .timeout
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("invalid --timeout")?;
    let config = ShellConfig::from_env().with_command_timeout(timeout);
    tracing::debug!(search_path = ?config.search_path().dirs(), "starting");

    let mut host = Host::new(config.clone());
    if let Some(line) = args.command {
        let ok = host.handle_line(&line);
        std::process::exit(if ok { 0 } else { 1 });
    }
    host.repl(config)
}
