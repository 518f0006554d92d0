//! Source-to-replica tree synchronization

use crate::{
    hasher::{ContentHasher, DEFAULT_CHUNK_SIZE},
    report::{CycleReport, EntryOperation},
};
use rmirror_types::{Error, Result};
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

/// Options controlling a mirror pass
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Chunk size used when streaming file contents for hashing
    pub hash_chunk_size: usize,
    /// Propagate the source file's modification time to the replica
    pub preserve_timestamps: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            hash_chunk_size: DEFAULT_CHUNK_SIZE,
            preserve_timestamps: true,
        }
    }
}

/// Walks the source tree and makes the replica match it
///
/// Directories are created before their contents are placed. A file
/// is copied only when the replica has no file at the same relative
/// path or when the two content digests differ; equal digests leave
/// the replica untouched, which makes repeated passes idempotent.
/// The source tree is never written to.
#[derive(Debug, Clone)]
pub struct TreeSynchronizer {
    hasher: ContentHasher,
    options: MirrorOptions,
}

impl TreeSynchronizer {
    /// Create a synchronizer with default options
    pub fn new() -> Self {
        Self::with_options(MirrorOptions::default())
    }

    /// Create a synchronizer with custom options
    pub fn with_options(options: MirrorOptions) -> Self {
        Self {
            hasher: ContentHasher::with_chunk_size(options.hash_chunk_size),
            options,
        }
    }

    /// Mirror the source tree into the replica tree
    ///
    /// Per-entry failures (unreadable file, permission error, entry
    /// vanished mid-walk) are logged, recorded in the report and do
    /// not abort the walk. Only a failure to read the source root
    /// itself aborts the pass.
    pub async fn synchronize(&self, source_root: &Path, replica_root: &Path) -> Result<CycleReport> {
        let start = Instant::now();
        let mut report = CycleReport::new();

        self.sync_dir(source_root, replica_root, source_root, &mut report)
            .await
            .map_err(|e| {
                Error::sync(format!(
                    "Failed to walk source root '{}': {}",
                    source_root.display(),
                    e
                ))
            })?;

        report.stats.duration = start.elapsed();
        debug!(
            "Synchronize pass: {} dirs created, {} files copied, {} skipped, {} errors",
            report.stats.directories_created,
            report.stats.files_copied,
            report.stats.files_skipped,
            report.stats.errors
        );
        Ok(report)
    }

    /// Recursively synchronize one source directory
    ///
    /// Returns `Err` only when the directory itself cannot be read;
    /// the caller decides whether that is fatal (source root) or a
    /// recorded per-entry failure (subdirectory).
    fn sync_dir<'a>(
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
                    .strip_prefix(source_root)
                    .unwrap_or(&entry_path)
                    .to_path_buf();
                let target = replica_root.join(&relative);

                let metadata = match entry.metadata().await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!("Skipping '{}': {}", entry_path.display(), e);
                        report.record_failure(relative, EntryOperation::Scan, e.to_string());
                        continue;
                    }
                };

                if metadata.file_type().is_symlink() {
                    debug!("Skipping symlink: {}", entry_path.display());
                    continue;
                }

                if metadata.is_dir() {
                    match self.ensure_directory(&target).await {
                        Ok(created) => {
                            if created {
                                info!("Created directory: {}", target.display());
                                report.stats.directories_created += 1;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to create directory '{}': {}", target.display(), e);
                            report.record_failure(relative, EntryOperation::CreateDir, e.to_string());
                            // No point descending into a subtree we cannot mirror
                            continue;
                        }
                    }

                    if let Err(e) = self
                        .sync_dir(source_root, replica_root, &entry_path, report)
                        .await
                    {
                        warn!("Failed to walk '{}': {}", entry_path.display(), e);
                        report.record_failure(relative, EntryOperation::Scan, e.to_string());
                    }
                } else {
                    match self.sync_file(&entry_path, &target).await {
                        Ok(Some(bytes)) => {
                            info!(
                                "Copied file: {} -> {}",
                                entry_path.display(),
                                target.display()
                            );
                            report.stats.files_copied += 1;
                            report.stats.bytes_copied += bytes;
                        }
                        Ok(None) => {
                            report.stats.files_skipped += 1;
                        }
                        Err(e) => {
                            warn!("Failed to copy '{}': {}", entry_path.display(), e);
                            report.record_failure(relative, EntryOperation::Copy, e.to_string());
                        }
                    }
                }
            }

            Ok(())
        })
    }

    /// Make sure a replica directory exists, returning whether it was created
    async fn ensure_directory(&self, target: &Path) -> Result<bool> {
        match fs::metadata(target).await {
            Ok(meta) if meta.is_dir() => return Ok(false),
            Ok(_) => {
                // A file occupies the path where a directory belongs
                fs::remove_file(target).await.map_err(|e| Error::Io {
                    message: format!(
                        "Failed to replace file '{}' with directory: {}",
                        target.display(),
                        e
                    ),
                })?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Io {
                    message: format!("Failed to stat '{}': {}", target.display(), e),
                });
            }
        }

        fs::create_dir_all(target).await.map_err(|e| Error::Io {
            message: format!("Failed to create directory '{}': {}", target.display(), e),
        })?;
        Ok(true)
    }

    /// Copy one file into the replica when its content differs
    ///
    /// Returns the number of bytes copied, or `None` when the digests
    /// matched and the replica file was left alone.
    async fn sync_file(&self, source_file: &Path, target: &Path) -> Result<Option<u64>> {
        match fs::metadata(target).await {
            Ok(meta) if meta.is_dir() => {
                // A directory occupies the path where a file belongs
                fs::remove_dir_all(target).await.map_err(|e| Error::Io {
                    message: format!(
                        "Failed to replace directory '{}' with file: {}",
                        target.display(),
                        e
                    ),
                })?;
            }
            Ok(_) => {
                // Content comparison, never size or timestamps alone
                let source_digest = self.hasher.digest_file(source_file).await?;
                let target_digest = self.hasher.digest_file(target).await?;
                if source_digest == target_digest {
                    return Ok(None);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Io {
                    message: format!("Failed to stat '{}': {}", target.display(), e),
                });
            }
        }

        let bytes = fs::copy(source_file, target).await.map_err(|e| Error::Io {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                source_file.display(),
                target.display(),
                e
            ),
        })?;

        if self.options.preserve_timestamps {
            let metadata = fs::metadata(source_file).await.map_err(|e| Error::Io {
                message: format!(
                    "Failed to get metadata for '{}': {}",
                    source_file.display(),
                    e
                ),
            })?;

            if let Ok(modified) = metadata.modified() {
                filetime::set_file_mtime(target, filetime::FileTime::from_system_time(modified))
                    .map_err(|e| Error::Io {
                        message: format!(
                            "Failed to set modification time for '{}': {}",
                            target.display(),
                            e
                        ),
                    })?;
            }
        }

        Ok(Some(bytes))
    }
}

impl Default for TreeSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
