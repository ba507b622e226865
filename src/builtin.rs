use crate::env::Environment;
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::Path;

/// Commands implemented in-process rather than by spawning a program.
///
/// Resolution is a plain name lookup; see [`Builtin::from_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Change the current working directory. With no argument goes to `$HOME`, with `-`
    /// goes back to `$OLDPWD`.
    Cd,
    /// Set environment variables from `NAME=VALUE` pairs.
    Export,
}

impl Builtin {
    pub const ALL: &'static [Builtin] = &[Builtin::Cd, Builtin::Export];

    /// Canonical name of the command, e.g. "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Export => "export",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Runs the builtin against `env`.
    ///
    /// Failures never escape: they are written to `stderr` and reported as `false`.
    pub fn execute(
        self,
        args: &[String],
        env: &mut dyn Environment,
        stderr: &mut dyn Write,
    ) -> bool {
        let result = match self {
            Builtin::Cd => cd(args, env),
            Builtin::Export => export(args, env, stderr),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(builtin = self.name(), error = %e, "builtin failed");
                let _ = writeln!(stderr, "{e:#}");
                false
            }
        }
    }
}

fn cd(args: &[String], env: &mut dyn Environment) -> Result<()> {
    let target: OsString = match args.first().map(String::as_str) {
        None => match env.var("HOME") {
            Some(home) => home,
            None => bail!("cd: HOME not set"),
        },
        Some("-") => match env.var("OLDPWD") {
            Some(old) => old,
            None => bail!("cd: OLDPWD not set"),
        },
        Some(path) => path.into(),
    };
    let target = Path::new(&target);

    let old_pwd = env
        .current_dir()
        .context("cd: can't determine current directory")?;

    env.set_current_dir(target)
        .with_context(|| format!("cd: {}", target.display()))?;
    env.set_var("OLDPWD", old_pwd.as_os_str());
    tracing::debug!(from = %old_pwd.display(), to = %target.display(), "changed directory");
    Ok(())
}

fn export(args: &[String], env: &mut dyn Environment, stderr: &mut dyn Write) -> Result<()> {
    for pair in args {
        let (name, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
        if name.is_empty() || name.contains('\0') || value.contains('\0') {
            writeln!(stderr, "export: `{pair}': not a valid identifier")?;
            continue;
        }
        env.set_var(name, OsStr::new(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::FakeEnv;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Builtin::from_name("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::from_name("export"), Some(Builtin::Export));
        assert_eq!(Builtin::from_name("Cd"), None);
        assert_eq!(Builtin::from_name("echo"), None);
    }

    #[test]
    fn test_cd_to_absolute_path_records_oldpwd() {
        let start = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());

        let ok = Builtin::Cd.execute(
            &args(&[target.path().to_str().unwrap()]),
            &mut env,
            &mut Vec::new(),
        );

        assert!(ok);
        assert_eq!(env.current_dir, target.path());
        assert_eq!(env.var("OLDPWD").as_deref(), Some(start.path().as_os_str()));
    }

    #[test]
    fn test_cd_home_then_back() {
        let start = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());
        env.set_var("HOME", home.path().as_os_str());

        assert!(Builtin::Cd.execute(&[], &mut env, &mut Vec::new()));
        assert_eq!(env.current_dir, home.path());

        assert!(Builtin::Cd.execute(&args(&["-"]), &mut env, &mut Vec::new()));
        assert_eq!(env.current_dir, start.path());
        assert_eq!(env.var("OLDPWD").as_deref(), Some(home.path().as_os_str()));
    }

    #[test]
    fn test_cd_without_home_warns() {
        let start = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());
        let mut err = Vec::new();

        assert!(!Builtin::Cd.execute(&[], &mut env, &mut err));
        assert_eq!(String::from_utf8(err).unwrap(), "cd: HOME not set\n");
        assert_eq!(env.current_dir, start.path());
        assert_eq!(env.var("OLDPWD"), None);
    }

    #[test]
    fn test_cd_dash_without_oldpwd_warns() {
        let start = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());
        let mut err = Vec::new();

        assert!(!Builtin::Cd.execute(&args(&["-"]), &mut env, &mut err));
        assert_eq!(String::from_utf8(err).unwrap(), "cd: OLDPWD not set\n");
    }

    #[test]
    fn test_cd_nonexistent_path_fails_without_side_effects() {
        let start = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());
        let mut err = Vec::new();

        let ok = Builtin::Cd.execute(&args(&["no_such_dir"]), &mut env, &mut err);

        assert!(!ok);
        assert!(String::from_utf8(err).unwrap().starts_with("cd: no_such_dir: "));
        assert_eq!(env.current_dir, start.path());
        assert_eq!(env.var("OLDPWD"), None);
    }

    #[test]
    fn test_cd_ignores_extra_arguments() {
        let start = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());

        let ok = Builtin::Cd.execute(
            &args(&[target.path().to_str().unwrap(), "ignored"]),
            &mut env,
            &mut Vec::new(),
        );

        assert!(ok);
        assert_eq!(env.current_dir, target.path());
    }

    #[test]
    fn test_export_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(dir.path().to_path_buf());

        assert!(Builtin::Export.execute(
            &args(&["FOO=1", "BAR=", "BAZ", "URL=a=b"]),
            &mut env,
            &mut Vec::new(),
        ));

        assert_eq!(env.var("FOO").as_deref(), Some(OsStr::new("1")));
        assert_eq!(env.var("BAR").as_deref(), Some(OsStr::new("")));
        assert_eq!(env.var("BAZ").as_deref(), Some(OsStr::new("")));
        assert_eq!(env.var("URL").as_deref(), Some(OsStr::new("a=b")));
    }

    #[test]
    fn test_export_skips_invalid_names_but_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(dir.path().to_path_buf());
        let mut err = Vec::new();

        assert!(Builtin::Export.execute(&args(&["=oops", "OK=yes"]), &mut env, &mut err));

        assert_eq!(env.var("OK").as_deref(), Some(OsStr::new("yes")));
        assert_eq!(env.vars.len(), 1);
        assert!(String::from_utf8(err).unwrap().contains("=oops"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_cd_round_trips_non_utf8_directories() {
        use std::os::unix::ffi::OsStrExt;
        let root = tempfile::tempdir().unwrap();
        let odd = root.path().join(OsStr::from_bytes(b"dir\xff"));
        std::fs::create_dir(&odd).unwrap();
        let home = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(odd.clone());
        env.set_var("HOME", home.path().as_os_str());

        assert!(Builtin::Cd.execute(&[], &mut env, &mut Vec::new()));
        assert_eq!(env.var("OLDPWD").as_deref(), Some(odd.as_os_str()));

        assert!(Builtin::Cd.execute(&args(&["-"]), &mut env, &mut Vec::new()));
        assert_eq!(env.current_dir, odd);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_cd_uses_non_utf8_home() {
        use std::os::unix::ffi::OsStrExt;
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join(OsStr::from_bytes(b"home\xfe"));
        std::fs::create_dir(&home).unwrap();
        let start = tempfile::tempdir().unwrap();
        let mut env = FakeEnv::new(start.path().to_path_buf());
        env.set_var("HOME", home.as_os_str());
        let mut err = Vec::new();

        assert!(Builtin::Cd.execute(&[], &mut env, &mut err));
        assert!(err.is_empty());
        assert_eq!(env.current_dir, home);
    }
}
