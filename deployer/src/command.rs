//! External command execution.
//!
//! Signing shells out to `gpg`. The [`CommandExecutor`] trait keeps that
//! call behind a seam so the signing flow can be tested without the tool
//! installed.

use std::io;
use std::process::{Command, Output};

/// Trait for executing external commands, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor: Send + Sync {
    /// Run `cmd` with `args` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> io::Result<Output>;
}

/// Real command executor that invokes system commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> io::Result<Output> {
        Command::new(cmd).args(args).output()
    }
}

/// Returns the last line of a command's stderr, or its exit status when
/// stderr is empty.
#[must_use]
pub fn failure_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map_or_else(|| output.status.to_string(), str::to_owned)
}
