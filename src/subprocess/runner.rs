use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ProcessError;

/// How long a timed-out process group gets between SIGTERM and SIGKILL.
#[cfg(unix)]
const GROUP_KILL_GRACE: Duration = Duration::from_millis(100);

/// Where the standard streams of a child process go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Collect stdout and stderr into the returned [`ProcessOutput`].
    #[default]
    Capture,
    /// Forward stdout and stderr to the current process's own streams.
    Inherit,
}

#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub output: OutputMode,
}

impl ProcessCommand {
    /// Captured command with no extra environment, directory or timeout.
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(|s| s.as_ref().to_string()).collect(),
            env: HashMap::new(),
            working_dir: None,
            timeout: None,
            output: OutputMode::default(),
        }
    }

    /// Render the command line for logs and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

/// Runs a single external process to completion.
///
/// Implementations must not retry and must not interpret exit codes: a process
/// that ran and exited non-zero is an `Ok` output whose status says so.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Log command execution details
    fn log_command_start(command: &ProcessCommand) {
        tracing::debug!("Executing subprocess: {}", command.display());

        if !command.env.is_empty() {
            // Values may carry credential paths; keys are enough to debug with.
            let mut keys: Vec<&str> = command.env.keys().map(String::as_str).collect();
            keys.sort_unstable();
            tracing::trace!("Extra environment variables: {}", keys.join(", "));
        }

        if let Some(ref dir) = command.working_dir {
            tracing::trace!("Working directory: {:?}", dir);
        }

        if let Some(timeout) = command.timeout {
            tracing::trace!("Timeout: {:?}", timeout);
        }
    }

    /// Configure the command with environment and working directory
    fn configure_command(
        command: &ProcessCommand,
    ) -> Result<tokio::process::Command, ProcessError> {
        let mut cmd = tokio::process::Command::new(&command.program);

        #[cfg(unix)]
        {
            // Own process group: a timeout kills git together with the ssh it spawned
            cmd.process_group(0);
        }

        cmd.args(&command.args);

        // Dropping the child (timeout expiry) must terminate the process
        cmd.kill_on_drop(true);

        cmd.env_clear();
        Self::preserve_essential_env(&mut cmd, &command.program)?;

        // Explicit variables take precedence
        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        Self::configure_stdio(&mut cmd, command);
        Ok(cmd)
    }

    /// Preserve essential system environment variables.
    /// Fails if PATH is missing rather than spawning with no search path.
    fn preserve_essential_env(
        cmd: &mut tokio::process::Command,
        program: &str,
    ) -> Result<(), ProcessError> {
        match std::env::var("PATH") {
            Ok(value) => {
                cmd.env("PATH", value);
            }
            Err(e) => {
                tracing::error!(
                    "Required environment variable PATH is not available for command '{}': {:?}",
                    program,
                    e
                );
                return Err(ProcessError::InternalError {
                    message: format!(
                        "Critical environment variable PATH is not available (required for '{}' command): {:?}",
                        program, e
                    ),
                });
            }
        }

        // ssh needs HOME for known_hosts and SSH_AUTH_SOCK for agent-held keys
        let optional_vars = [
            "HOME",
            "USER",
            "SHELL",
            "TMPDIR",
            "TERM",
            "SSH_AUTH_SOCK",
        ];

        let mut missing = Vec::new();
        for var in &optional_vars {
            match std::env::var(var) {
                Ok(value) => {
                    cmd.env(var, value);
                }
                Err(_) => missing.push(*var),
            }
        }

        Self::preserve_locale_env(cmd);

        if !missing.is_empty() {
            tracing::trace!(
                "Optional env vars not available for '{}': {}",
                program,
                missing.join(", ")
            );
        }

        Ok(())
    }

    /// Preserve locale variables, falling back to a UTF-8 LANG
    fn preserve_locale_env(cmd: &mut tokio::process::Command) {
        match std::env::var("LANG") {
            Ok(value) => {
                cmd.env("LANG", value);
            }
            Err(_) => {
                let locale = std::env::var("LC_ALL")
                    .or_else(|_| std::env::var("LC_CTYPE"))
                    .unwrap_or_else(|_| "en_US.UTF-8".to_string());
                cmd.env("LANG", locale);
            }
        }

        for var in ["LC_ALL", "LC_CTYPE"] {
            if let Ok(value) = std::env::var(var) {
                cmd.env(var, value);
            }
        }
    }

    /// Configure stdio pipes for the process
    fn configure_stdio(cmd: &mut tokio::process::Command, command: &ProcessCommand) {
        use std::process::Stdio;

        // Nothing may block on a prompt
        cmd.stdin(Stdio::null());

        match command.output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
            }
        }
    }

    /// Wait for process with optional timeout.
    ///
    /// On expiry the child is dropped (killed through `kill_on_drop`) and the
    /// rest of its process group is terminated.
    async fn wait_with_timeout(
        child: tokio::process::Child,
        timeout: Option<Duration>,
    ) -> Result<std::process::Output, ProcessError> {
        let Some(duration) = timeout else {
            return child.wait_with_output().await.map_err(ProcessError::Io);
        };

        let pid = child.id();
        match tokio::time::timeout(duration, child.wait_with_output()).await {
            Ok(result) => result.map_err(ProcessError::Io),
            Err(_) => {
                if let Some(pid) = pid {
                    Self::kill_process_group(pid).await;
                }
                Err(ProcessError::Timeout(duration))
            }
        }
    }

    /// Kill every process in the group led by `pid`.
    ///
    /// SIGKILL follows the grace period unconditionally so members stopped on
    /// terminal input (an ssh passphrase prompt) are taken down too.
    #[cfg(unix)]
    async fn kill_process_group(pid: u32) {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        let pgid = Pid::from_raw(-(pid as i32));
        if let Err(e) = signal::kill(pgid, Signal::SIGTERM) {
            tracing::trace!("Process group {} already gone: {}", pid, e);
            return;
        }

        tokio::time::sleep(GROUP_KILL_GRACE).await;
        let _ = signal::kill(pgid, Signal::SIGKILL);
    }

    #[cfg(not(unix))]
    async fn kill_process_group(_pid: u32) {}

    /// Convert process exit status to our ExitStatus enum
    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        match status.signal() {
            Some(signal) => ExitStatus::Signal(signal),
            None => ExitStatus::Error(1),
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    fn build_output(
        output: std::process::Output,
        status: ExitStatus,
        duration: Duration,
    ) -> ProcessOutput {
        ProcessOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration,
        }
    }

    /// Log the process execution result
    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        let command_str = command.display();

        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "Subprocess completed successfully in {:?}: {}",
                    result.duration,
                    command_str
                );
                tracing::trace!("Stdout length: {} bytes", result.stdout.len());
                tracing::trace!("Stderr length: {} bytes", result.stderr.len());
            }
            ExitStatus::Error(code) => {
                tracing::debug!(
                    "Subprocess failed with exit code {} in {:?}: {}",
                    code,
                    result.duration,
                    command_str
                );
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "Subprocess terminated by signal {} in {:?}: {}",
                    signal,
                    result.duration,
                    command_str
                );
            }
        }
    }

    /// Map spawn error to ProcessError
    fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        if error.kind() == std::io::ErrorKind::NotFound {
            if let Ok(path) = std::env::var("PATH") {
                tracing::error!(
                    "Command '{}' not found. Parent process PATH: {}",
                    command.program,
                    path
                );
            }
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            tracing::error!(
                "Failed to spawn '{}': {:?} (kind: {:?})",
                command.program,
                error,
                error.kind()
            );
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = std::time::Instant::now();

        Self::log_command_start(&command);

        let mut cmd = Self::configure_command(&command)?;
        let child = cmd
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        let output = match Self::wait_with_timeout(child, command.timeout).await {
            Ok(output) => output,
            Err(ProcessError::Timeout(duration)) => {
                tracing::warn!(
                    "Subprocess timed out after {:?} and was killed: {}",
                    duration,
                    command.display()
                );
                return Err(ProcessError::Timeout(duration));
            }
            Err(e) => return Err(e),
        };

        let duration = start.elapsed();
        let status = Self::parse_exit_status(output.status);
        let result = Self::build_output(output, status, duration);

        Self::log_result(&result, &command);

        Ok(result)
    }
}
