use std::time::Duration;

/// Failure of a single process invocation.
///
/// `CommandNotFound`, `SpawnFailed`, `InternalError` and `Io` mean the
/// process never ran to completion. `ExitCode` and `Signal` mean it ran and
/// ended badly. `Timeout` means it was killed after exceeding its budget.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    /// Carries everything the process printed; only stderr goes into the message.
    #[error("'{command}' exited with code {code}{}", format_stderr(.stderr))]
    ExitCode {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("'{command}' terminated by signal {signal}")]
    Signal { command: String, signal: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ProcessError {
    /// The exit code when the process ran and exited non-zero.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::ExitCode { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the process ran and exited with a failure code.
    pub fn is_exit_code(&self) -> bool {
        self.exit_code().is_some()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProcessError::Timeout(_))
    }
}
