//! Repository client driving one temporary working copy

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::GitError;
use super::tempdir::{DirAllocator, SystemTempDirs};
use super::types::{CommitOutcome, DiffProbe};
use crate::subprocess::ShellExecutor;

const GIT: &str = "git";

/// Exit code of `git diff --quiet` when the compared trees differ.
const DIFF_DIFFERENCES_EXIT_CODE: i32 = 1;

/// Identity and execution settings fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    pub user: String,
    pub email: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub private_ssh_key_path: Option<PathBuf>,
}

/// Performs the clone → add → commit → push → delete sequence against one
/// remote, one git invocation per operation.
///
/// The working directory is set by a successful [`clone_repo`](Self::clone_repo).
/// Operations after [`delete_local_repo`](Self::delete_local_repo) are a caller
/// error and will fail in git.
pub struct GitClient {
    executor: Arc<ShellExecutor>,
    dirs: Arc<dyn DirAllocator>,
    dir: Option<PathBuf>,
    user: String,
    email: String,
}

impl GitClient {
    /// Client running real `git` processes.
    pub fn new(params: ClientParams) -> Self {
        let executor = ShellExecutor::new(params.timeout, params.private_ssh_key_path);
        Self::from_executor(Arc::new(executor), params.user, params.email)
    }

    /// Client using an externally built executor, e.g. one backed by a mock runner.
    pub fn from_executor(
        executor: Arc<ShellExecutor>,
        user: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            dirs: Arc::new(SystemTempDirs::new()),
            dir: None,
            user: user.into(),
            email: email.into(),
        }
    }

    pub fn with_dir_allocator(mut self, dirs: Arc<dyn DirAllocator>) -> Self {
        self.dirs = dirs;
        self
    }

    /// Local working copy, once cloned.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn executor(&self) -> &Arc<ShellExecutor> {
        &self.executor
    }

    /// Clone `branch` of `url` into a new `<prefix><random>` directory and
    /// return its path.
    ///
    /// If git fails the new directory is removed again and the client stays
    /// without a working copy.
    pub async fn clone_repo(
        &mut self,
        prefix: &str,
        branch: &str,
        url: &str,
    ) -> Result<PathBuf, GitError> {
        let clone_dir = self.dirs.allocate(prefix).map_err(GitError::TempDir)?;
        debug!("Cloning {} (branch {}) into {}", url, branch, clone_dir.display());

        let args = vec![
            "clone".to_string(),
            "-b".to_string(),
            branch.to_string(),
            url.to_string(),
            clone_dir.to_string_lossy().into_owned(),
        ];

        if let Err(source) = self.executor.exec(GIT, &clone_dir, &args).await {
            if let Err(e) = tokio::fs::remove_dir_all(&clone_dir).await {
                warn!(
                    "Failed to clean up {} after unsuccessful clone: {}",
                    clone_dir.display(),
                    e
                );
            }
            return Err(GitError::CloneFailed {
                url: url.to_string(),
                branch: branch.to_string(),
                source,
            });
        }

        self.dir = Some(clone_dir.clone());
        Ok(clone_dir)
    }

    /// Stage `paths`, given relative to the working copy.
    pub async fn add<I, P>(&self, paths: I) -> Result<(), GitError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dir = self.require_dir()?;

        let mut args = vec!["add".to_string(), "--".to_string()];
        let before = args.len();
        args.extend(
            paths
                .into_iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned()),
        );
        if args.len() == before {
            return Err(GitError::NoPathsToAdd);
        }

        self.executor
            .exec(GIT, dir, &args)
            .await
            .map_err(|e| GitError::command("add", e))?;
        Ok(())
    }

    /// Check whether the index differs from HEAD.
    pub async fn probe_staged_changes(&self) -> Result<DiffProbe, GitError> {
        let dir = self.require_dir()?;
        let args = ["diff", "--cached", "--quiet"].map(String::from);

        match self.executor.exec(GIT, dir, &args).await {
            Ok(_) => Ok(DiffProbe::NoDifferences),
            Err(e) if e.exit_code() == Some(DIFF_DIFFERENCES_EXIT_CODE) => {
                Ok(DiffProbe::DifferencesPresent)
            }
            Err(e) => Err(GitError::command("diff", e)),
        }
    }

    /// Commit staged changes as the configured author.
    ///
    /// With nothing staged this is a successful no-op reporting
    /// [`CommitOutcome::NothingToCommit`].
    pub async fn commit(&self, message: &str) -> Result<CommitOutcome, GitError> {
        if self.probe_staged_changes().await? == DiffProbe::NoDifferences {
            info!("Nothing to commit (the repository contained identical files), moving on");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let dir = self.require_dir()?;
        let args = vec![
            "commit".to_string(),
            "-m".to_string(),
            message.to_string(),
            format!("--author={} <{}>", self.user, self.email),
        ];
        self.executor
            .exec(GIT, dir, &args)
            .await
            .map_err(|e| GitError::command("commit", e))?;

        debug!("Committed to {} as {} <{}>", dir.display(), self.user, self.email);
        Ok(CommitOutcome::Committed)
    }

    /// Push the current branch to its upstream.
    pub async fn push(&self) -> Result<(), GitError> {
        let dir = self.require_dir()?;
        self.executor
            .exec(GIT, dir, &["push".to_string()])
            .await
            .map_err(|e| GitError::command("push", e))?;
        Ok(())
    }

    /// Remove the working copy from disk.
    pub async fn delete_local_repo(&self) -> Result<(), GitError> {
        let dir = self.require_dir()?;
        tokio::fs::remove_dir_all(dir)
            .await
            .map_err(|source| GitError::RemoveDir {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!("Deleted local repository {}", dir.display());
        Ok(())
    }

    fn require_dir(&self) -> Result<&Path, GitError> {
        self.dir.as_deref().ok_or(GitError::NotCloned)
    }
}
