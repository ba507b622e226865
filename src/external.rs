//! Running programs found on the search path.

use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Command that is not a builtin.
///
/// Arguments are handed to the program verbatim; no shell sees them a second time.
#[derive(Debug)]
pub struct ExternalCommand<'a> {
    name: &'a str,
    program: &'a Path,
    args: &'a [String],
}

impl<'a> ExternalCommand<'a> {
    /// Creates a command ready to run.
    ///
    /// # Arguments
    /// * `name` - What the user typed. Becomes `argv[0]` of the child on unix.
    /// * `program` - The file the resolver matched `name` to.
    /// * `args` - Arguments after the command name, already unquoted.
    pub fn new(name: &'a str, program: &'a Path, args: &'a [String]) -> Self {
        Self {
            name,
            program,
            args,
        }
    }

    /// Run the program with inherited standard streams and wait for it.
    ///
    /// # Arguments
    /// * `timeout` - Kill the child once this much time has passed. `None` waits forever.
    ///
    /// # Returns
    /// True only for exit status 0. Spawn failures, signals and timeouts are all reported as
    /// false.
    pub fn execute(&self, timeout: Option<Duration>) -> bool {
        let mut cmd = Command::new(self.program);
        cmd.args(self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(self.name);
        }
        let child = cmd.spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command = self.name, error = %e, "failed to spawn");
                return false;
            }
        };

        let status = match timeout {
            None => child.wait().map(Some),
            Some(limit) => wait_with_timeout(&mut child, limit),
        };
        match status {
            Ok(Some(status)) => {
                tracing::info!(command = self.name, code = exit_code(status), "command exited");
                status.success()
            }
            Ok(None) => {
                tracing::warn!(command = self.name, ?timeout, "command timed out and was killed");
                false
            }
            Err(e) => {
                tracing::warn!(command = self.name, error = %e, "failed to wait for command");
                false
            }
        }
    }
}

/// Polls `child` until it exits or `limit` elapses.
///
/// A limit too large to turn into a deadline waits without one.
///
/// # Returns
/// `Ok(Some(status))` when the child exited on its own, `Ok(None)` when it was killed and
/// reaped after the deadline passed.
fn wait_with_timeout(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = Instant::now().checked_add(limit) else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Exit code as a shell would report it in `$?`.
///
/// Signals map to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
