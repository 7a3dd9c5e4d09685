//! # gitops-git
//!
//! Minimal git client for GitOps bootstrap: clone a branch into a temporary
//! directory, stage files, commit only when something changed, push, and
//! remove the clone.
//!
//! ```no_run
//! # async fn demo() -> Result<(), gitops_git::git::GitError> {
//! use gitops_git::git::{ClientParams, GitClient};
//! use std::time::Duration;
//!
//! let mut client = GitClient::new(ClientParams {
//!     user: "Flux".to_string(),
//!     email: "flux@example.com".to_string(),
//!     timeout: Duration::from_secs(20),
//!     private_ssh_key_path: None,
//! });
//! let dir = client
//!     .clone_repo("gitops-", "main", "git@github.com:example/gitops.git")
//!     .await?;
//! std::fs::write(dir.join("README.md"), "managed by flux\n").unwrap();
//! client.add(["README.md"]).await?;
//! client.commit("Add README").await?;
//! client.push().await?;
//! client.delete_local_repo().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `subprocess` - Process runner seam (real and recording mock) and the git execution context
//! - `git` - Repository client and its lifecycle
//! - `config` - YAML configuration for the client
//! - `error` - Crate-wide error codes
//! - `cli` - The `gitops-push` command
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod subprocess;
