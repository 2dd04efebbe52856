//! Process execution for `ipmitool` invocations.
//!
//! Everything that touches the device goes through a [`CommandRunner`], so
//! tests can swap the real process spawner for a scripted one. [`IpmiTool`]
//! layers the configured command prefix and the check-mode gate on top.

use std::fmt::{self, Display, Formatter};
use std::process::{Command, Stdio};

use tracing::{debug, info, trace, warn};

use crate::config::ToolConfig;
use crate::error::IpmiError;

const REDACTED: &str = "********";

/// A fully resolved argument vector, with an optional secret argument that
/// is masked whenever the command is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
    secret: Option<usize>,
}

impl CommandLine {
    pub fn new(args: Vec<String>) -> Self {
        Self { args, secret: None }
    }

    /// Mark the argument at `index` as sensitive.
    pub fn with_secret(mut self, index: usize) -> Self {
        self.secret = Some(index);
        self
    }

    /// Full argument vector including the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if self.secret == Some(i) {
                f.write_str(REDACTED)?;
            } else if arg.is_empty() {
                f.write_str("''")?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code of the command (0 = success, -1 when killed by a signal).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout and stderr joined, for error messages.
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            stdout.to_string()
        } else if stdout.is_empty() {
            stderr.to_string()
        } else {
            format!("{stdout}\n{stderr}")
        }
    }
}

/// Capability to run a command to completion and capture its output.
pub trait CommandRunner {
    fn run(&mut self, cmd: &CommandLine) -> Result<ExecResult, IpmiError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, cmd: &CommandLine) -> Result<ExecResult, IpmiError> {
        (**self).run(cmd)
    }
}

/// Spawns real processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &CommandLine) -> Result<ExecResult, IpmiError> {
        let Some((program, args)) = cmd.args().split_first() else {
            return Err(IpmiError::Spawn {
                command: cmd.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| IpmiError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        Ok(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// `ipmitool` bound to a runner, a command prefix and the check-mode flag.
#[derive(Debug)]
pub struct IpmiTool<R> {
    runner: R,
    prefix: Vec<String>,
    check_mode: bool,
}

impl<R: CommandRunner> IpmiTool<R> {
    pub fn new(runner: R, config: &ToolConfig, check_mode: bool) -> Self {
        Self {
            runner,
            prefix: config.command_prefix(),
            check_mode,
        }
    }

    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Read-only subcommand that must succeed. Returns stdout.
    pub fn query(&mut self, args: &[&str]) -> Result<String, IpmiError> {
        let cmd = self.command(args, None);
        let result = self.execute(&cmd)?;
        require_success(&cmd, result).map(|result| result.stdout)
    }

    /// Read-only subcommand whose exit code the caller interprets itself.
    pub fn probe(&mut self, args: &[&str], secret: Option<usize>) -> Result<ExecResult, IpmiError> {
        let cmd = self.command(args, secret);
        self.execute(&cmd)
    }

    /// Subcommand that changes device state. Skipped in check mode.
    ///
    /// Returns whether the command was actually issued.
    pub fn mutate(&mut self, args: &[&str], secret: Option<usize>) -> Result<bool, IpmiError> {
        let cmd = self.command(args, secret);
        if self.check_mode {
            info!(command = %cmd, "check mode: not executing");
            return Ok(false);
        }
        let result = self.execute(&cmd)?;
        require_success(&cmd, result)?;
        Ok(true)
    }

    /// Redacted rendering of the command `args` would run.
    pub fn display_command(&self, args: &[&str], secret: Option<usize>) -> String {
        self.command(args, secret).to_string()
    }

    fn command(&self, args: &[&str], secret: Option<usize>) -> CommandLine {
        let mut full = self.prefix.clone();
        full.extend(args.iter().map(|arg| arg.to_string()));
        let cmd = CommandLine::new(full);
        match secret {
            Some(index) => cmd.with_secret(self.prefix.len() + index),
            None => cmd,
        }
    }

    fn execute(&mut self, cmd: &CommandLine) -> Result<ExecResult, IpmiError> {
        debug!(command = %cmd, "executing");
        let result = self.runner.run(cmd)?;
        if result.success() {
            trace!(command = %cmd, "command succeeded");
        } else {
            warn!(
                command = %cmd,
                exit_code = result.exit_code,
                stderr = %result.stderr.trim(),
                "command failed"
            );
        }
        Ok(result)
    }
}

fn require_success(cmd: &CommandLine, result: ExecResult) -> Result<ExecResult, IpmiError> {
    if result.success() {
        Ok(result)
    } else {
        Err(IpmiError::ToolFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
