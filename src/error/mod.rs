use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;
use crate::subprocess::ProcessError;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Crate-wide error with a stable numeric code per failure kind
#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution {
        code: u16,
        message: String,
        command: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Git operation failed: {message}")]
    Git {
        code: u16,
        message: String,
        operation: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl GitOpsError {
    /// Create a configuration error with specific code and file
    pub fn config_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create an execution error with specific code
    pub fn execution_with_code(
        code: u16,
        message: impl Into<String>,
        command: Option<String>,
    ) -> Self {
        Self::Execution {
            code,
            message: message.into(),
            command,
            exit_code: None,
            source: None,
        }
    }

    /// Create a git error with specific code and operation
    pub fn git(code: u16, message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Git {
            code,
            message: message.into(),
            operation: operation.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Execution { source: src, .. }
            | Self::Git { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Set the exit code for an execution error
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        if let Self::Execution {
            exit_code: ref mut ec,
            ..
        } = self
        {
            *ec = Some(exit_code);
        }
        self
    }

    /// Process exit code to use when this error ends the program
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Execution { .. } => 5,
            Self::Git { .. } => 7,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Execution { code, .. }
            | Self::Git { code, .. } => *code,
        }
    }

    /// Message for end users, without the code prefix
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, path, .. } => match path {
                Some(p) => format!("Configuration problem in {}: {}", p.display(), message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Execution {
                message, command, ..
            } => match command {
                Some(cmd) => format!("Command '{}' failed: {}", cmd, message),
                None => format!("Execution error: {}", message),
            },
            Self::Git {
                message, operation, ..
            } => format!("Git {} failed: {}", operation, message),
        }
    }

    /// Terminal report: code, what the code means, what happened, and any
    /// underlying cause not already spelled out in the message.
    pub fn report(&self) -> String {
        let code = self.code();
        let mut report = format!(
            "[E{:04}] {}\n  {}",
            code,
            describe_error_code(code),
            self.user_message()
        );

        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            let text = err.to_string();
            if !report.contains(&text) {
                report.push_str(&format!("\n  Caused by: {}", text));
            }
            cause = err.source();
        }
        report
    }
}

pub type Result<T> = std::result::Result<T, GitOpsError>;

impl From<ProcessError> for GitOpsError {
    fn from(err: ProcessError) -> Self {
        let (code, command, exit_code) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()), None)
            }
            ProcessError::SpawnFailed { command, .. } => {
                (ErrorCode::EXEC_SPAWN_FAILED, Some(command.clone()), None)
            }
            ProcessError::Timeout(_) => (ErrorCode::EXEC_TIMEOUT, None, None),
            ProcessError::ExitCode { command, code, .. } => (
                ErrorCode::EXEC_SUBPROCESS_FAILED,
                Some(command.clone()),
                Some(*code),
            ),
            ProcessError::Signal { command, .. } => {
                (ErrorCode::EXEC_SIGNAL_RECEIVED, Some(command.clone()), None)
            }
            ProcessError::Io(_) => (ErrorCode::EXEC_SPAWN_FAILED, None, None),
            ProcessError::InternalError { .. } | ProcessError::MockExpectationNotMet(_) => {
                (ErrorCode::EXEC_GENERIC, None, None)
            }
        };

        let mut error = GitOpsError::execution_with_code(code, err.to_string(), command);
        if let Some(exit_code) = exit_code {
            error = error.with_exit_code(exit_code);
        }
        error.with_source(err)
    }
}

impl From<GitError> for GitOpsError {
    fn from(err: GitError) -> Self {
        let (code, operation) = match &err {
            GitError::TempDir(_) => (ErrorCode::GIT_TEMP_DIR, "clone"),
            GitError::CloneFailed { .. } => (ErrorCode::GIT_CLONE_FAILED, "clone"),
            GitError::NotCloned => (ErrorCode::GIT_NOT_CLONED, "state check"),
            GitError::NoPathsToAdd => (ErrorCode::GIT_NOTHING_TO_ADD, "add"),
            GitError::Command { operation, source } => {
                let code = if source.is_timeout() {
                    ErrorCode::EXEC_TIMEOUT
                } else {
                    ErrorCode::GIT_COMMAND_FAILED
                };
                (code, *operation)
            }
            GitError::RemoveDir { .. } => (ErrorCode::GIT_REMOVE_DIR, "delete"),
        };

        let message = match &err {
            GitError::Command { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        GitOpsError::git(code, message, operation).with_source(err)
    }
}

impl From<serde_yaml::Error> for GitOpsError {
    fn from(err: serde_yaml::Error) -> Self {
        GitOpsError::config_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax", None)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_process_exit_code_maps_to_subprocess_failed() {
        let err: GitOpsError = ProcessError::ExitCode {
            command: "git push".to_string(),
            code: 1,
            stdout: String::new(),
            stderr: "rejected".to_string(),
        }
        .into();

        assert_eq!(err.code(), ErrorCode::EXEC_SUBPROCESS_FAILED);
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().starts_with("[E4003]"));
        match err {
            GitOpsError::Execution {
                command, exit_code, ..
            } => {
                assert_eq!(command.as_deref(), Some("git push"));
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("Expected Execution, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_is_its_own_code() {
        let err: GitOpsError = ProcessError::Timeout(Duration::from_secs(20)).into();
        assert_eq!(err.code(), ErrorCode::EXEC_TIMEOUT);

        let err: GitOpsError =
            GitError::command("push", ProcessError::Timeout(Duration::from_secs(20))).into();
        assert_eq!(err.code(), ErrorCode::EXEC_TIMEOUT);
        assert_eq!(
            err.user_message(),
            "Git push failed: Process timed out after 20s"
        );
    }

    #[test]
    fn test_git_state_errors_map_to_git_codes() {
        let err: GitOpsError = GitError::NotCloned.into();
        assert_eq!(err.code(), ErrorCode::GIT_NOT_CLONED);
        assert_eq!(err.exit_code(), 7);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_report_describes_code_and_adds_hidden_causes() {
        let yaml = serde_yaml::from_str::<serde_yaml::Value>("git: [unclosed").unwrap_err();
        let err: GitOpsError = yaml.into();

        let report = err.report();
        let mut lines = report.lines();
        assert_eq!(
            lines.next(),
            Some("[E1002] Configuration file is not valid YAML")
        );
        assert_eq!(
            lines.next(),
            Some("  Configuration problem: Invalid YAML syntax")
        );
        assert!(lines.next().unwrap().starts_with("  Caused by: "));
    }

    #[test]
    fn test_report_skips_causes_already_in_message() {
        let err: GitOpsError = GitError::command(
            "push",
            ProcessError::ExitCode {
                command: "git push".to_string(),
                code: 1,
                stdout: String::new(),
                stderr: "rejected".to_string(),
            },
        )
        .into();

        assert_eq!(
            err.report(),
            "[E6010] A git command failed\n  Git push failed: 'git push' exited with code 1: rejected"
        );
    }
}
