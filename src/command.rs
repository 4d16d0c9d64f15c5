/// Shell command execution: run the configured command string under `sh -c`,
/// wait for it, and report exit status and duration.
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Result of a command that ran to completion (successfully or not).
#[derive(Debug)]
pub struct CommandOutcome {
    /// Process exit code (None if killed by signal).
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the command.
    pub duration: Duration,
    /// Child PID (for logging/diagnostics).
    pub pid: u32,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Errors that prevent a command from producing an exit status.
#[derive(Debug)]
pub enum CommandError {
    /// Failed to spawn the shell.
    Spawn { source: std::io::Error },
    /// Failed while waiting for the child to exit.
    Wait { source: std::io::Error },
    /// The command outlived the configured timeout and its process group was killed.
    TimedOut { limit: Duration, pid: u32 },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Spawn { source } => {
                write!(f, "failed to spawn command shell: {}", source)
            }
            CommandError::Wait { source } => {
                write!(f, "failed to wait for command: {}", source)
            }
            CommandError::TimedOut { limit, pid } => {
                write!(
                    f,
                    "command (pid {}) timed out after {}ms and was killed",
                    pid,
                    limit.as_millis()
                )
            }
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source } => Some(source),
            CommandError::Wait { source } => Some(source),
            CommandError::TimedOut { .. } => None,
        }
    }
}

/// Runs a command string to completion.
pub trait CommandRunner {
    async fn run(&self, command: &str) -> Result<CommandOutcome, CommandError>;
}

/// Runs commands through `sh -c`, inheriting stdout/stderr.
#[derive(Debug, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    /// `timeout = None` waits for the command indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        let start = Instant::now();

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .process_group(0) // New process group so a timeout can kill the whole pipeline
            .spawn()
            .map_err(|e| CommandError::Spawn { source: e })?;

        let pid = child.id().unwrap_or(0);
        tracing::debug!(pid, "command started");

        let status = match self.timeout {
            None => child
                .wait()
                .await
                .map_err(|e| CommandError::Wait { source: e })?,
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited.map_err(|e| CommandError::Wait { source: e })?,
                Err(_) => {
                    kill_group(pid);
                    // Reap so the child doesn't linger as a zombie.
                    let _ = child.wait().await;
                    return Err(CommandError::TimedOut { limit, pid });
                }
            },
        };

        Ok(CommandOutcome {
            exit_code: status.code(),
            duration: start.elapsed(),
            pid,
        })
    }
}

fn kill_group(pid: u32) {
    if pid == 0 {
        return;
    }
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::warn!(pid, error = %e, "failed to kill command process group");
    }
}
