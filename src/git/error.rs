//! Git client error types

use crate::subprocess::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`GitClient`](super::GitClient) operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Cannot create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Failed to clone branch '{branch}' of {url}: {source}")]
    CloneFailed {
        url: String,
        branch: String,
        #[source]
        source: ProcessError,
    },

    #[error("No cloned repository: clone_repo has not succeeded on this client")]
    NotCloned,

    #[error("No paths given to add")]
    NoPathsToAdd,

    #[error("Git {operation} failed: {source}")]
    Command {
        operation: &'static str,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to remove {}: {source}", .path.display())]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    pub(crate) fn command(operation: &'static str, source: ProcessError) -> Self {
        GitError::Command { operation, source }
    }

    /// The underlying process error, if the failure came from running git.
    pub fn process_error(&self) -> Option<&ProcessError> {
        match self {
            GitError::CloneFailed { source, .. } | GitError::Command { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// True when a git invocation was killed for exceeding the time budget.
    pub fn is_timeout(&self) -> bool {
        self.process_error().is_some_and(ProcessError::is_timeout)
    }

    /// True when the client was used out of order (no clone, nothing to add).
    pub fn is_state_error(&self) -> bool {
        matches!(self, GitError::NotCloned | GitError::NoPathsToAdd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_is_timeout_looks_through_command_errors() {
        let err = GitError::command("push", ProcessError::Timeout(Duration::from_secs(20)));
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Git push failed: Process timed out after 20s"
        );

        let err = GitError::command(
            "push",
            ProcessError::ExitCode {
                command: "git push".to_string(),
                code: 1,
                stdout: String::new(),
                stderr: String::new(),
            },
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_state_errors() {
        assert!(GitError::NotCloned.is_state_error());
        assert!(GitError::NoPathsToAdd.is_state_error());
        assert!(GitError::NotCloned.process_error().is_none());
    }
}
