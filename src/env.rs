use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

/// Key-value and working-directory state that builtins read and mutate.
///
/// The dispatcher only talks to the process through this trait, so a host that keeps its
/// own notion of environment (or a test) can substitute a different store.
pub trait Environment {
    /// Get the value of an environment variable. Values need not be valid UTF-8.
    fn var(&self, key: &str) -> Option<OsString>;

    /// Set or override an environment variable.
    fn set_var(&mut self, key: &str, value: &OsStr);

    fn current_dir(&self) -> io::Result<PathBuf>;

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// The real process environment and working directory.
///
/// Both are process-wide. A multi-threaded host must serialize every use of this type
/// together with any other code that touches the environment or the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        stdenv::var_os(key)
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        // SAFETY: callers uphold the single-threaded access documented on the type.
        unsafe { stdenv::set_var(key, value) }
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        stdenv::current_dir()
    }

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
        stdenv::set_current_dir(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// In-memory environment whose working directory must exist on disk.
    pub(crate) struct FakeEnv {
        pub(crate) vars: HashMap<String, OsString>,
        pub(crate) current_dir: PathBuf,
    }

    impl FakeEnv {
        pub(crate) fn new(current_dir: PathBuf) -> Self {
            Self {
                vars: HashMap::new(),
                current_dir,
            }
        }
    }

    impl Environment for FakeEnv {
        fn var(&self, key: &str) -> Option<OsString> {
            self.vars.get(key).cloned()
        }

        fn set_var(&mut self, key: &str, value: &OsStr) {
            self.vars.insert(key.to_owned(), value.to_owned());
        }

        fn current_dir(&self) -> io::Result<PathBuf> {
            Ok(self.current_dir.clone())
        }

        fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
            let path = self.current_dir.join(path);
            if !fs::metadata(&path)?.is_dir() {
                return Err(io::Error::other("Not a directory"));
            }
            self.current_dir = path;
            Ok(())
        }
    }

    /// Serializes tests that touch the process-wide environment or working directory.
    pub(crate) fn lock_process_state() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_env_set_and_get_var() {
        let _lock = lock_process_state();
        let mut env = ProcessEnvironment;
        let key = format!("REPL_SHELL_COMMANDS_ENV_TEST_{}", std::process::id());

        assert_eq!(env.var(&key), None);
        env.set_var(&key, OsStr::new("VALUE"));
        assert_eq!(env.var(&key), Some(OsString::from("VALUE")));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = ProcessEnvironment;
        assert!(env.var("PATH").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_env_keeps_non_utf8_values() {
        use std::os::unix::ffi::OsStrExt;
        let _lock = lock_process_state();
        let mut env = ProcessEnvironment;
        let key = format!("REPL_SHELL_COMMANDS_RAW_TEST_{}", std::process::id());
        let raw = OsStr::from_bytes(b"caf\xe9");

        env.set_var(&key, raw);
        assert_eq!(env.var(&key).as_deref(), Some(raw));
    }
}
