//! Execution context shared by every command a git client issues.
//!
//! [`ShellExecutor`] pins down what stays fixed for the lifetime of a client
//! (time budget, SSH identity, stream handling) and turns each call into
//! exactly one [`ProcessCommand`] for the underlying [`ProcessRunner`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{
    ExitStatus, OutputMode, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner,
};

/// Environment variable git consults for the ssh command line.
pub const GIT_SSH_COMMAND: &str = "GIT_SSH_COMMAND";

#[derive(Clone)]
pub struct ShellExecutor {
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
    private_ssh_key_path: Option<PathBuf>,
    output: OutputMode,
}

impl ShellExecutor {
    /// Executor spawning real processes.
    pub fn new(timeout: Duration, private_ssh_key_path: Option<PathBuf>) -> Self {
        Self::with_runner(
            Arc::new(TokioProcessRunner),
            timeout,
            private_ssh_key_path,
        )
    }

    pub fn with_runner(
        runner: Arc<dyn ProcessRunner>,
        timeout: Duration,
        private_ssh_key_path: Option<PathBuf>,
    ) -> Self {
        // An empty path means "no key", same as not passing one
        let private_ssh_key_path =
            private_ssh_key_path.filter(|path| !path.as_os_str().is_empty());
        Self {
            runner,
            timeout,
            private_ssh_key_path,
            output: OutputMode::Capture,
        }
    }

    /// Stream child output to this process's stdout/stderr instead of capturing it.
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn private_ssh_key_path(&self) -> Option<&Path> {
        self.private_ssh_key_path.as_deref()
    }

    /// Value for `GIT_SSH_COMMAND` when a key is configured.
    pub fn ssh_command(&self) -> Option<String> {
        self.private_ssh_key_path.as_ref().map(|path| {
            format!(
                "ssh -i {}",
                shell_words::quote(&path.to_string_lossy())
            )
        })
    }

    /// Run `program` with `args` inside `working_dir`.
    ///
    /// Succeeds only on a zero exit. A non-zero exit becomes
    /// [`ProcessError::ExitCode`], with whatever output was captured, so callers can tell it apart from a process
    /// that never started or ran out of time.
    pub async fn exec(
        &self,
        program: &str,
        working_dir: &Path,
        args: &[String],
    ) -> Result<ProcessOutput, ProcessError> {
        let mut command = ProcessCommand::new(program, args);
        command.working_dir = Some(working_dir.to_path_buf());
        command.timeout = Some(self.timeout);
        command.output = self.output;

        if let Some(ssh_command) = self.ssh_command() {
            command.env.insert(GIT_SSH_COMMAND.to_string(), ssh_command);
        }

        let display = command.display();
        let output = self.runner.run(command).await?;

        match output.status {
            ExitStatus::Success => Ok(output),
            ExitStatus::Error(code) => Err(ProcessError::ExitCode {
                command: display,
                code,
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            ExitStatus::Signal(signal) => Err(ProcessError::Signal {
                command: display,
                signal,
            }),
        }
    }
}

impl std::fmt::Debug for ShellExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellExecutor")
            .field("timeout", &self.timeout)
            .field("private_ssh_key_path", &self.private_ssh_key_path)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
