//! Per-cycle outcome reporting

use rmirror_types::CycleStats;
use std::fmt;
use std::path::PathBuf;

/// Operation that failed for a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOperation {
    /// Reading a directory's entries
    Scan,
    /// Creating a replica directory
    CreateDir,
    /// Copying a file into the replica
    Copy,
    /// Removing a replica file
    RemoveFile,
    /// Removing a replica directory subtree
    RemoveDir,
}

impl fmt::Display for EntryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scan => "scan",
            Self::CreateDir => "create directory",
            Self::Copy => "copy",
            Self::RemoveFile => "remove file",
            Self::RemoveDir => "remove directory",
        };
        f.write_str(name)
    }
}

/// A single per-entry failure that did not abort the cycle
#[derive(Debug, Clone)]
pub struct EntryFailure {
    /// Path of the affected entry
    pub path: PathBuf,
    /// Operation that failed
    pub operation: EntryOperation,
    /// Underlying error message
    pub message: String,
}

/// Outcome of one synchronize or prune pass
///
/// Failed entries are recorded rather than aborting the walk; the
/// next cycle retries them naturally.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Counters for the pass
    pub stats: CycleStats,
    /// Per-entry failures encountered during the pass
    pub failures: Vec<EntryFailure>,
}

impl CycleReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a per-entry failure
    pub fn record_failure(
        &mut self,
        path: PathBuf,
        operation: EntryOperation,
        message: impl Into<String>,
    ) {
        self.stats.errors += 1;
        self.failures.push(EntryFailure {
            path,
            operation,
            message: message.into(),
        });
    }

    /// True when any per-entry failure occurred
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: CycleReport) {
        self.stats.merge(&other.stats);
        self.failures.extend(other.failures);
    }
}
