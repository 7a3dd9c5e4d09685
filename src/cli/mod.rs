//! `gitops-push` command: copy files into a fresh clone and publish them

pub mod args;

pub use args::Cli;

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::GitOpsError;
use crate::git::{CommitOutcome, GitClient};

/// Prefix of the temporary clone directory
pub const CLONE_PREFIX: &str = "gitops-";

pub async fn run(cli: Cli) -> Result<CommitOutcome> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    check_inputs(&cli)?;

    let git = &config.git;
    let mut client = GitClient::new(git.client_params());
    let clone_dir = client
        .clone_repo(CLONE_PREFIX, &git.branch, &git.url)
        .await
        .map_err(GitOpsError::from)?;
    info!("Cloned {} ({}) into {}", git.url, git.branch, clone_dir.display());

    let result = publish(&client, &clone_dir, &cli).await;

    if cli.keep_clone {
        info!("Keeping local clone at {}", clone_dir.display());
    } else if let Err(e) = client.delete_local_repo().await {
        warn!("{}", e);
    }

    let outcome = result?;
    match outcome {
        CommitOutcome::Committed => info!("Pushed changes to {} ({})", git.url, git.branch),
        CommitOutcome::NothingToCommit => info!("{} ({}) already up to date", git.url, git.branch),
    }
    Ok(outcome)
}

/// Copy the files into the clone, then add, commit and push them.
async fn publish(client: &GitClient, clone_dir: &Path, cli: &Cli) -> Result<CommitOutcome> {
    let target = clone_dir.join(&cli.target_dir);
    tokio::fs::create_dir_all(&target)
        .await
        .with_context(|| format!("Cannot create {}", target.display()))?;

    let mut staged = Vec::with_capacity(cli.files.len());
    for file in &cli.files {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        let dest = target.join(name);
        tokio::fs::copy(file, &dest)
            .await
            .with_context(|| format!("Cannot copy {} to {}", file.display(), dest.display()))?;
        staged.push(relative_to_repo(&cli.target_dir, Path::new(name)));
    }

    client.add(&staged).await.map_err(GitOpsError::from)?;
    let outcome = client
        .commit(&cli.message)
        .await
        .map_err(GitOpsError::from)?;
    client.push().await.map_err(GitOpsError::from)?;
    Ok(outcome)
}

fn relative_to_repo(target_dir: &Path, name: &Path) -> PathBuf {
    if target_dir == Path::new(".") {
        name.to_path_buf()
    } else {
        target_dir.join(name)
    }
}

/// Reject inputs that would fail only after the clone was made.
fn check_inputs(cli: &Cli) -> Result<()> {
    if cli
        .target_dir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        bail!(
            "--target-dir must be a relative path inside the repository, got {}",
            cli.target_dir.display()
        );
    }

    // Every file lands directly in the target dir, so names must not collide
    let mut names = HashMap::new();
    for file in &cli.files {
        if !file.is_file() {
            bail!("{} is not a file", file.display());
        }
        if let Some(name) = file.file_name() {
            if let Some(previous) = names.insert(name, file) {
                bail!(
                    "{} and {} would both be copied to {}",
                    previous.display(),
                    file.display(),
                    relative_to_repo(&cli.target_dir, Path::new(name)).display()
                );
            }
        }
    }
    Ok(())
}
