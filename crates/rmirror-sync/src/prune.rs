//! Removal of replica entries that no longer exist in the source

use crate::report::{CycleReport, EntryOperation};
use rmirror_types::{Error, Result};
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

/// Walks the replica tree and deletes extraneous entries
///
/// A replica file with no source file at the same relative path is
/// removed; a replica directory with no source directory at the same
/// relative path is removed as a whole subtree, without inspecting
/// its contents or recursing into it afterwards. Entries that vanish
/// while the walk is in progress are skipped.
#[derive(Debug, Clone, Default)]
pub struct TreePruner;

impl TreePruner {
    /// Create a pruner
    pub fn new() -> Self {
        Self
    }

    /// Remove every replica entry without a source counterpart
    ///
    /// Per-entry removal failures are logged, recorded in the report
    /// and do not abort the walk. Only a failure to read the replica
    /// root itself aborts the pass.
    pub async fn prune(&self, source_root: &Path, replica_root: &Path) -> Result<CycleReport> {
        let start = Instant::now();
        let mut report = CycleReport::new();

        self.prune_dir(source_root, replica_root, replica_root, &mut report)
            .await
            .map_err(|e| {
                Error::sync(format!(
                    "Failed to walk replica root '{}': {}",
                    replica_root.display(),
                    e
                ))
            })?;

        report.stats.duration = start.elapsed();
        debug!(
            "Prune pass: {} files removed, {} directories removed, {} errors",
            report.stats.files_removed, report.stats.directories_removed, report.stats.errors
        );
        Ok(report)
    }

    /// Recursively prune one replica directory
    ///
    /// Returns `Err` only when the directory itself cannot be read;
    /// the caller decides whether that is fatal (replica root) or a
    /// recorded per-entry failure (subdirectory).
    fn prune_dir<'a>(
        &'a self,
        source_root: &'a Path,
        replica_root: &'a Path,
        dir: &'a Path,
        report: &'a mut CycleReport,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut entries = fs::read_dir(dir).await.map_err(|e| Error::Io {
                message: format!("Failed to read directory '{}': {}", dir.display(), e),
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| Error::Io {
                message: format!("Failed to read directory entry: {}", e),
            })? {
                let entry_path = entry.path();
                let relative = entry_path
                    .strip_prefix(replica_root)
                    .unwrap_or(&entry_path)
                    .to_path_buf();
                let counterpart = source_root.join(&relative);

                let file_type = match entry.file_type().await {
                    Ok(file_type) => file_type,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        // Removed underneath us, nothing left to prune
                        debug!("Entry vanished mid-walk: {}", entry_path.display());
                        continue;
                    }
                    Err(e) => {
                        warn!("Skipping '{}': {}", entry_path.display(), e);
                        report.record_failure(relative, EntryOperation::Scan, e.to_string());
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if directory_exists(&counterpart).await {
                        if let Err(e) = self
                            .prune_dir(source_root, replica_root, &entry_path, report)
                            .await
                        {
                            warn!("Failed to walk '{}': {}", entry_path.display(), e);
                            report.record_failure(relative, EntryOperation::Scan, e.to_string());
                        }
                    } else {
                        match fs::remove_dir_all(&entry_path).await {
                            Ok(()) => {
                                info!("Removed directory: {}", entry_path.display());
                                report.stats.directories_removed += 1;
                            }
                            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                                debug!("Directory vanished mid-walk: {}", entry_path.display());
                            }
                            Err(e) => {
                                warn!(
                                    "Failed to remove directory '{}': {}",
                                    entry_path.display(),
                                    e
                                );
                                report.record_failure(
                                    relative,
                                    EntryOperation::RemoveDir,
                                    e.to_string(),
                                );
                            }
                        }
                    }
                } else if !file_exists(&counterpart).await {
                    match fs::remove_file(&entry_path).await {
                        Ok(()) => {
                            info!("Removed file: {}", entry_path.display());
                            report.stats.files_removed += 1;
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            debug!("File vanished mid-walk: {}", entry_path.display());
                        }
                        Err(e) => {
                            warn!("Failed to remove file '{}': {}", entry_path.display(), e);
                            report.record_failure(
                                relative,
                                EntryOperation::RemoveFile,
                                e.to_string(),
                            );
                        }
                    }
                }
            }

            Ok(())
        })
    }
}

/// True when the source has a directory at this path
async fn directory_exists(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// True when the source has a non-directory entry at this path
async fn file_exists(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio::fs;

    async fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir(&source).await.unwrap();
        fs::create_dir(&replica).await.unwrap();
        (temp_dir, source, replica)
    }

    #[tokio::test]
    async fn test_extra_file_removed() {
        let (_guard, source, replica) = setup().await;
        fs::write(source.join("keep.txt"), b"hi").await.unwrap();
        fs::write(replica.join("keep.txt"), b"hi").await.unwrap();
        fs::write(replica.join("extra.txt"), b"bye").await.unwrap();

        let report = TreePruner::new().prune(&source, &replica).await.unwrap();

        assert_eq!(report.stats.files_removed, 1);
        assert!(replica.join("keep.txt").exists());
        assert!(!replica.join("extra.txt").exists());
    }

    #[tokio::test]
    async fn test_extra_subtree_removed_whole() {
        let (_guard, source, replica) = setup().await;
        fs::create_dir_all(replica.join("gone/nested")).await.unwrap();
        fs::write(replica.join("gone/nested/file.txt"), b"x")
            .await
            .unwrap();

        let report = TreePruner::new().prune(&source, &replica).await.unwrap();

        // One subtree removal, contents not counted individually
        assert_eq!(report.stats.directories_removed, 1);
        assert_eq!(report.stats.files_removed, 0);
        assert!(!replica.join("gone").exists());
    }

    #[tokio::test]
    async fn test_matching_entries_untouched() {
        let (_guard, source, replica) = setup().await;
        fs::create_dir(source.join("dir")).await.unwrap();
        fs::write(source.join("dir/a.txt"), b"a").await.unwrap();
        fs::create_dir(replica.join("dir")).await.unwrap();
        fs::write(replica.join("dir/a.txt"), b"a").await.unwrap();

        let report = TreePruner::new().prune(&source, &replica).await.unwrap();

        assert!(report.stats.is_noop());
        assert!(replica.join("dir/a.txt").exists());
    }

    #[tokio::test]
    async fn test_nested_extra_file_inside_kept_dir() {
        let (_guard, source, replica) = setup().await;
        fs::create_dir(source.join("dir")).await.unwrap();
        fs::create_dir(replica.join("dir")).await.unwrap();
        fs::write(replica.join("dir/stale.txt"), b"stale")
            .await
            .unwrap();

        let report = TreePruner::new().prune(&source, &replica).await.unwrap();

        assert_eq!(report.stats.files_removed, 1);
        assert!(replica.join("dir").exists());
        assert!(!replica.join("dir/stale.txt").exists());
    }

    #[tokio::test]
    async fn test_source_never_mutated() {
        let (_guard, source, replica) = setup().await;
        fs::write(source.join("only_source.txt"), b"safe")
            .await
            .unwrap();
        fs::write(replica.join("extra.txt"), b"bye").await.unwrap();

        TreePruner::new().prune(&source, &replica).await.unwrap();

        assert_eq!(
            fs::read(source.join("only_source.txt")).await.unwrap(),
            b"safe"
        );
    }

    #[tokio::test]
    async fn test_empty_replica_is_noop() {
        let (_guard, source, replica) = setup().await;
        fs::write(source.join("a.txt"), b"a").await.unwrap();

        let report = TreePruner::new().prune(&source, &replica).await.unwrap();
        assert!(report.stats.is_noop());
        assert!(!report.has_failures());
    }
}
