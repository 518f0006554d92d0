//! Core data types for rmirror
//!
//! Per-cycle statistics for mirror operations. Nothing here persists
//! between cycles; every cycle rediscovers all state from the
//! filesystem.

use std::time::Duration;

/// Statistics for one synchronize-then-prune cycle
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleStats {
    /// Number of directories created in the replica
    pub directories_created: u64,
    /// Number of files copied or overwritten in the replica
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of files left untouched (digests matched)
    pub files_skipped: u64,
    /// Number of files removed from the replica
    pub files_removed: u64,
    /// Number of directory subtrees removed from the replica
    pub directories_removed: u64,
    /// Number of per-entry errors encountered
    pub errors: u64,
    /// Total duration of the cycle
    pub duration: Duration,
}

impl CycleStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the cycle changed nothing in the replica
    pub fn is_noop(&self) -> bool {
        self.directories_created == 0
            && self.files_copied == 0
            && self.files_removed == 0
            && self.directories_removed == 0
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &CycleStats) {
        self.directories_created += other.directories_created;
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.files_skipped += other.files_skipped;
        self.files_removed += other.files_removed;
        self.directories_removed += other.directories_removed;
        self.errors += other.errors;
        self.duration += other.duration;
    }
}
