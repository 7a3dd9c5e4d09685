//! Bootstrap configuration loaded from YAML
//!
//! ```yaml
//! git:
//!   url: git@github.com:example/gitops.git
//!   branch: main
//!   user: Flux
//!   email: flux@example.com
//!   private_ssh_key_path: /home/bot/.ssh/id_rsa
//!   timeout: 30s
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ErrorCode, GitOpsError, Result};
use crate::git::ClientParams;

pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_USER: &str = "Flux";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Remote to clone and push, usually an SSH URL
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Commit author name
    #[serde(default = "default_user")]
    pub user: String,
    /// Commit author email
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub private_ssh_key_path: Option<PathBuf>,
    /// Budget for each individual git invocation
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: default_branch(),
            user: default_user(),
            email: String::new(),
            private_ssh_key_path: None,
            timeout: default_timeout(),
        }
    }
}

impl GitConfig {
    pub fn client_params(&self) -> ClientParams {
        ClientParams {
            user: self.user.clone(),
            email: self.email.clone(),
            timeout: self.timeout,
            private_ssh_key_path: self.private_ssh_key_path.clone(),
        }
    }
}

impl Config {
    /// Read and parse a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::CONFIG_NOT_FOUND
            } else {
                ErrorCode::CONFIG_GENERIC
            };
            GitOpsError::config_with_code(
                code,
                format!("Cannot read configuration file: {}", path.display()),
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_yaml(&contents).map_err(|e| match e {
            GitOpsError::Config {
                code,
                message,
                source,
                ..
            } => GitOpsError::Config {
                code,
                message,
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Check the values the git client cannot work without.
    pub fn validate(&self) -> Result<()> {
        let git = &self.git;

        let missing = [
            ("git.url", git.url.trim().is_empty()),
            ("git.branch", git.branch.trim().is_empty()),
            ("git.user", git.user.trim().is_empty()),
            ("git.email", git.email.trim().is_empty()),
        ];
        if let Some((field, _)) = missing.iter().find(|(_, empty)| *empty) {
            return Err(GitOpsError::config_with_code(
                ErrorCode::CONFIG_MISSING_REQUIRED,
                format!("{field} must be set"),
                None,
            ));
        }

        if git.timeout.is_zero() {
            return Err(GitOpsError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "git.timeout must be greater than zero",
                None,
            ));
        }

        if let Some(key) = &git.private_ssh_key_path {
            if !key.as_os_str().is_empty() && !key.is_file() {
                return Err(GitOpsError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("git.private_ssh_key_path {} is not a file", key.display()),
                    None,
                ));
            }
        }

        Ok(())
    }
}
