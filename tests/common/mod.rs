//! Shared fixtures: a local bare remote seeded with one commit on `main`.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

use gitops_git::subprocess::{
    ProcessCommand, ProcessError, ProcessOutput, ProcessRunner, TokioProcessRunner,
};

/// Run git synchronously and fail the test on a non-zero exit.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git must be installed to run integration tests");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub struct Remote {
    pub root: TempDir,
    pub bare: PathBuf,
    pub url: String,
}

impl Remote {
    /// `<author name> <<author email>>|<subject>` of the tip of `branch`.
    pub fn head_summary(&self, branch: &str) -> String {
        git(
            &self.bare,
            &["log", "-1", "--format=%an <%ae>|%s", branch],
        )
    }

    pub fn commit_count(&self, branch: &str) -> usize {
        git(&self.bare, &["rev-list", "--count", branch])
            .parse()
            .unwrap()
    }
}

pub fn bare_remote_with_main() -> Remote {
    let root = TempDir::new().unwrap();
    let bare = root.path().join("remote.git");
    git(root.path(), &["init", "--bare", "remote.git"]);
    git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    let seed = root.path().join("seed");
    std::fs::create_dir(&seed).unwrap();
    git(&seed, &["init"]);
    git(&seed, &["checkout", "-b", "main"]);
    std::fs::write(seed.join("README.md"), "# gitops\n").unwrap();
    git(&seed, &["add", "README.md"]);
    git(
        &seed,
        &[
            "-c",
            "user.name=seed",
            "-c",
            "user.email=seed@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-m",
            "initial",
        ],
    );
    git(&seed, &["push", bare.to_str().unwrap(), "main"]);

    let url = format!("file://{}", bare.display());
    Remote { root, bare, url }
}

/// Committer identity for a clone made by the client under test.
pub fn configure_identity(clone: &Path) {
    git(clone, &["config", "user.name", "committer"]);
    git(clone, &["config", "user.email", "committer@example.com"]);
    git(clone, &["config", "commit.gpgsign", "false"]);
}

/// Real runner that also keeps every command it ran.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<ProcessCommand>>,
}

impl RecordingRunner {
    pub fn count_subcommand(&self, subcommand: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    pub fn last_with_subcommand(&self, subcommand: &str) -> Option<ProcessCommand> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .cloned()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());
        TokioProcessRunner.run(command).await
    }
}
