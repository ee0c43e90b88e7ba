//! Lookup-time value substitution.
//!
//! # Security
//!
//! A value of the form `$(cmd args...)` runs `cmd` as a child process. Anyone who can write the
//! configuration file can therefore execute arbitrary programs as the reading process once
//! substitution is enabled. Never enable it for files from untrusted sources.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::process::Command;
use std::sync::Arc;

const FILE_PREFIX: &str = "$(<";
const COMMAND_PREFIX: &str = "$(";
const SUFFIX: &str = ")";

/// The substitution form a raw value uses, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// `$(<path)`: replaced by the contents of `path`.
    FileContents(&'a str),
    /// `$(cmd args...)`: replaced by the standard output of the command.
    Command(&'a str),
}

impl<'a> Pattern<'a> {
    /// File inclusion is checked before command capture, so `$(<x)` is never run as a command.
    #[must_use]
    pub fn classify(raw: &'a str) -> Option<Self> {
        if let Some(path) = raw
            .strip_prefix(FILE_PREFIX)
            .and_then(|s| s.strip_suffix(SUFFIX))
        {
            return Some(Self::FileContents(path));
        }

        raw.strip_prefix(COMMAND_PREFIX)
            .and_then(|s| s.strip_suffix(SUFFIX))
            .map(Self::Command)
    }
}

/// Runs an external program and captures its standard output.
pub trait CommandRunner: fmt::Debug + Send + Sync {
    /// Returns whatever the program wrote to stdout. An error means the program could not be
    /// started; a non-zero exit status is not an error.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Vec<u8>>;
}

/// Spawns programs directly through [`Command`], without a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Vec<u8>> {
        let output = Command::new(program).args(args).output()?;

        if !output.status.success() {
            tracing::debug!(program, status = %output.status, "substituted command exited unsuccessfully");
        }

        Ok(output.stdout)
    }
}

#[derive(Debug, Clone)]
pub struct Substitutor {
    runner: Arc<dyn CommandRunner>,
}

impl Default for Substitutor {
    fn default() -> Self {
        Self::new(Arc::new(SystemCommandRunner))
    }
}

impl Substitutor {
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Replace `raw` by the file contents or command output it refers to.
    ///
    /// Best effort: when the file cannot be read or the command cannot be started, `raw` is
    /// returned unchanged.
    #[must_use]
    pub fn substitute<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let result = match Pattern::classify(raw) {
            None => return Cow::Borrowed(raw),
            Some(Pattern::FileContents(path)) => fs::read(path),
            Some(Pattern::Command(command_line)) => {
                // Arguments are split on single spaces; there is no quoting.
                let mut parts = command_line.split(' ');
                let program = parts.next().unwrap_or_default();
                let args = parts.collect::<Vec<&str>>();
                self.runner.run(program, &args)
            }
        };

        match result {
            Ok(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
            Err(error) => {
                tracing::warn!(value = raw, %error, "substitution failed, using raw value");
                Cow::Borrowed(raw)
            }
        }
    }
}
