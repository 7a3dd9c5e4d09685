//! Outcome types for git client operations

/// Result of probing whether the index differs from HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffProbe {
    NoDifferences,
    DifferencesPresent,
}

/// What [`GitClient::commit`](super::GitClient::commit) ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created.
    Committed,
    /// The index matched HEAD, so no commit was made.
    NothingToCommit,
}

impl CommitOutcome {
    pub fn committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}
