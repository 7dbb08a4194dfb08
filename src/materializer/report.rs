use std::path::{Path, PathBuf};

use derive_more::{Deref, Display, From};
use snafu::Snafu;

/// Paths created on disk by one run, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From)]
pub struct CreatedItems(Vec<PathBuf>);

impl CreatedItems {
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.0.push(path.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[display("directory already exists")]
    AlreadyExists,
    #[display("a directory exists at this path")]
    TargetIsDirectory,
    #[display("kept existing entry")]
    KeptExisting,
    #[display("parent directory was not created")]
    ParentUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum RunOutcome {
    #[default]
    #[display("completed")]
    Completed,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), display("Failed to create {}", path.display()))]
pub struct CreationError {
    pub path: PathBuf,
    source: std::io::Error,
}

/// Everything one materialization run did. The caller owns the created
/// items and decides whether to undo them.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub created: CreatedItems,
    pub skipped: Vec<SkippedItem>,
    pub failures: Vec<CreationError>,
    pub outcome: RunOutcome,
}

impl MaterializeReport {
    pub(crate) fn skip(&mut self, path: &Path, reason: SkipReason) {
        self.skipped.push(SkippedItem {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), display("Failed to remove {}", path.display()))]
pub struct RemovalError {
    pub path: PathBuf,
    source: std::io::Error,
}

#[derive(Debug, Default)]
pub struct UndoReport {
    pub removed: Vec<PathBuf>,
    /// Logged paths that were already gone
    pub missing: Vec<PathBuf>,
    pub failures: Vec<RemovalError>,
}

impl UndoReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
