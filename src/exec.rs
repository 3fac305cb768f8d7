//! Gated shell command execution for dynamic variables.
//!
//! Dynamic variables are computed by running user-declared shell commands.
//! Because the commands come from a project-local file, execution is gated
//! behind an explicit enable flag and fails closed by default. Every
//! invocation is a fresh process with a hard timeout; a timed-out child is
//! killed, never left running.
//!
//! The one-time "command execution is active" warning is tracked as a field
//! on the executor instance, so warning behavior is deterministic per
//! invocation rather than process-global.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default timeout for dynamic variable commands in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Shell exit code used to signal "command not found".
#[cfg(not(windows))]
const NOT_FOUND_EXIT_CODE: i32 = 127;
#[cfg(windows)]
const NOT_FOUND_EXIT_CODE: i32 = 9009;

/// Error type for command execution failures.
///
/// Messages carry the command text plus the exit code, timeout value, or
/// captured stderr so a user can diagnose a failure without re-running.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Command execution is not enabled for this project.
    #[error(
        "command execution is disabled; refusing to run '{command}'\n\
         Fix: set `allow_commands: true` in rulecast.yaml to enable dynamic variables."
    )]
    Disabled {
        /// The command that was refused.
        command: String,
    },

    /// The shell could not resolve the executable.
    #[error("command not found: '{program}' (while running '{command}')")]
    NotFound {
        /// The full command string.
        command: String,
        /// The executable the shell failed to resolve.
        program: String,
    },

    /// The command exceeded the timeout and was killed.
    #[error("command '{command}' timed out after {timeout_secs}s and was killed")]
    Timeout {
        /// The full command string.
        command: String,
        /// The timeout that was exceeded.
        timeout_secs: u64,
    },

    /// The command exited with a non-zero status.
    #[error("command '{command}' failed with exit code {exit_code}: {stderr}")]
    Failed {
        /// The full command string.
        command: String,
        /// The non-zero exit code (-1 if unavailable).
        exit_code: i32,
        /// Captured stderr (trimmed).
        stderr: String,
    },
}

/// Executes shell command strings under an explicit enable flag and timeout.
///
/// One executor is created per resolution pass. It never retries and never
/// shares state across operations.
#[derive(Debug)]
pub struct CommandExecutor {
    enabled: bool,
    timeout: Duration,
    warned: bool,
}

impl CommandExecutor {
    /// Create an executor with the default timeout.
    ///
    /// `enabled` is the security gate: when false, `execute` always fails
    /// with [`ExecError::Disabled`] and no subprocess is spawned.
    pub fn new(enabled: bool) -> Self {
        Self::with_timeout(enabled, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create an executor with a specific timeout.
    pub fn with_timeout(enabled: bool, timeout: Duration) -> Self {
        Self {
            enabled,
            timeout,
            warned: false,
        }
    }

    /// Whether the one-time execution warning has been shown.
    pub fn warned(&self) -> bool {
        self.warned
    }

    /// Run a command through the system shell and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// * [`ExecError::Disabled`] - the security gate is closed
    /// * [`ExecError::NotFound`] - the shell could not resolve the executable
    /// * [`ExecError::Timeout`] - the command was killed after the timeout
    /// * [`ExecError::Failed`] - the command exited non-zero
    pub fn execute(&mut self, command: &str) -> Result<String, ExecError> {
        if !self.enabled {
            return Err(ExecError::Disabled {
                command: command.to_string(),
            });
        }

        if !self.warned {
            self.warned = true;
            eprintln!(
                "Warning: command execution is enabled; \
                 project-defined shell commands will run on this machine."
            );
        }

        let mut child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecError::NotFound {
                command: command.to_string(),
                program: format!("{} ({})", shell_name(), e),
            })?;

        let (exit_code, timed_out) = wait_with_timeout(&mut child, self.timeout, command)?;

        if timed_out {
            return Err(ExecError::Timeout {
                command: command.to_string(),
                timeout_secs: self.timeout.as_secs(),
            });
        }

        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());
        let exit_code = exit_code.unwrap_or(-1);

        if exit_code == 0 {
            return Ok(stdout.trim_end().to_string());
        }

        if exit_code == NOT_FOUND_EXIT_CODE {
            return Err(ExecError::NotFound {
                command: command.to_string(),
                program: first_program(command),
            });
        }

        Err(ExecError::Failed {
            command: command.to_string(),
            exit_code,
            stderr: stderr.trim().to_string(),
        })
    }
}

/// Build the platform shell invocation for a command string.
fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

fn shell_name() -> &'static str {
    if cfg!(windows) { "cmd" } else { "sh" }
}

/// Extract the first shell word of a command for error messages.
fn first_program(command: &str) -> String {
    shell_words::split(command)
        .ok()
        .and_then(|words| words.into_iter().next())
        .unwrap_or_else(|| command.to_string())
}

/// Wait for a child process with timeout.
///
/// Returns (exit_code, timed_out). On timeout the child is killed and reaped.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
) -> Result<(Option<i32>, bool), ExecError> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok((status.code(), false));
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(ExecError::Failed {
                    command: command.to_string(),
                    exit_code: -1,
                    stderr: format!("failed to check process status: {}", e),
                });
            }
        }
    }
}

/// Kill a process and wait for it to terminate.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

/// Drain a captured pipe into a string (lossy).
fn read_pipe<R: std::io::Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
