use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

/// Commit files to a GitOps repository over SSH
#[derive(Parser, Debug)]
#[command(name = "gitops-push", version)]
#[command(
    about = "Clone a branch, commit the given files if they changed, push, and clean up",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// YAML configuration file; flags override its values
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// SSH URL of the GitOps repository
    #[arg(long)]
    pub git_url: Option<String>,

    /// Branch to clone and push
    #[arg(long)]
    pub git_branch: Option<String>,

    /// Commit author name
    #[arg(long)]
    pub git_user: Option<String>,

    /// Commit author email
    #[arg(long)]
    pub git_email: Option<String>,

    /// Private SSH key used to reach the repository
    #[arg(long)]
    pub git_private_ssh_key_path: Option<PathBuf>,

    /// Time budget per git command (e.g. 20s, 2m)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Commit message
    #[arg(short, long, default_value = "Add GitOps manifests")]
    pub message: String,

    /// Directory inside the repository that receives the files
    #[arg(long, default_value = ".")]
    pub target_dir: PathBuf,

    /// Leave the local clone on disk instead of deleting it
    #[arg(long)]
    pub keep_clone: bool,

    /// Files to copy into the repository and commit
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Apply command line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        let git = &mut config.git;
        if let Some(url) = &self.git_url {
            git.url = url.clone();
        }
        if let Some(branch) = &self.git_branch {
            git.branch = branch.clone();
        }
        if let Some(user) = &self.git_user {
            git.user = user.clone();
        }
        if let Some(email) = &self.git_email {
            git.email = email.clone();
        }
        if let Some(key) = &self.git_private_ssh_key_path {
            git.private_ssh_key_path = Some(key.clone());
        }
        if let Some(timeout) = self.timeout {
            git.timeout = timeout;
        }
    }

    /// Log filter matching the verbosity flag
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
