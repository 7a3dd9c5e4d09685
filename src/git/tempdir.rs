//! Allocation of uniquely named clone directories

use std::io;
use std::path::PathBuf;

/// Creates a fresh directory for each clone.
///
/// Implementations must never hand out a path that already exists.
pub trait DirAllocator: Send + Sync {
    fn allocate(&self, prefix: &str) -> io::Result<PathBuf>;
}

/// Allocates `<prefix><random>` directories under a root, by default the
/// system temporary directory. Directories are kept on disk after
/// allocation; removing them is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct SystemTempDirs {
    root: Option<PathBuf>,
}

impl SystemTempDirs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl DirAllocator for SystemTempDirs {
    fn allocate(&self, prefix: &str) -> io::Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(self.root())?;
        Ok(dir.keep())
    }
}
