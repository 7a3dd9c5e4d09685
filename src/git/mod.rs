//! Git repository client for GitOps bootstrap
//!
//! [`GitClient`] maps each operation onto a single `git` invocation through a
//! [`ShellExecutor`](crate::subprocess::ShellExecutor). Its only decision of
//! its own is skipping the commit when nothing is staged.

pub mod client;
pub mod error;
pub mod tempdir;
pub mod types;


pub use client::{ClientParams, GitClient};
pub use error::GitError;
pub use tempdir::{DirAllocator, SystemTempDirs};
pub use types::{CommitOutcome, DiffProbe};
