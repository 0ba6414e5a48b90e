use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{OslomError, Result};

/// How a finished process is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrPolicy {
    /// A non-zero exit or any text on standard error is a failure.
    #[default]
    Fatal,
    /// Only the exit status counts; diagnostics on standard error are kept
    /// but ignored.
    Ignore,
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub command: String,
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }

    pub fn is_success(&self, policy: StderrPolicy) -> bool {
        let exited_cleanly = self.status == Some(0);
        match policy {
            StderrPolicy::Fatal => exited_cleanly && self.stderr.trim().is_empty(),
            StderrPolicy::Ignore => exited_cleanly,
        }
    }

    /// Turn an unsuccessful run into [`OslomError::ToolFailed`].
    pub fn check(self, policy: StderrPolicy) -> Result<ExecOutput> {
        if self.is_success(policy) {
            Ok(self)
        } else {
            Err(OslomError::ToolFailed {
                command: self.command,
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Run `program` with `args` and wait for it to exit.
pub fn execute<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<ExecOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run(Command::new(program), args)
}

/// Like [`execute`], with `dir` as the child's working directory.
pub fn execute_in<I, S>(dir: impl AsRef<Path>, program: impl AsRef<OsStr>, args: I) -> Result<ExecOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.current_dir(dir);
    run(cmd, args)
}

fn run<I, S>(mut cmd: Command, args: I) -> Result<ExecOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    cmd.args(args).stdin(Stdio::null());
    let command = command_line(&cmd);
    info!("Running: {}", command);

    let output = cmd.output().map_err(|source| OslomError::Spawn {
        command: command.clone(),
        source,
    })?;
    let result = ExecOutput {
        command,
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!("{} exited with {:?}", result.command, result.status);
    Ok(result)
}

fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
