//! Source/replica pair validation
//!
//! Validation runs once, before the first cycle. It returns a
//! distinguishable error value rather than terminating the process,
//! so the caller decides exit behavior. The guarantees hold at the
//! moment validation succeeds; the engine tolerates them going stale
//! afterwards and repairs on later cycles.

use rmirror_types::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A source/replica pair that passed validation
///
/// Both paths are canonicalized and guaranteed non-overlapping at
/// validation time; the replica directory exists.
#[derive(Debug, Clone)]
pub struct ValidatedPaths {
    source: PathBuf,
    replica: PathBuf,
}

impl ValidatedPaths {
    /// The authoritative source root
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The mirrored replica root
    pub fn replica(&self) -> &Path {
        &self.replica
    }
}

/// Validate a source/replica pair for mirroring
///
/// Checks that the source exists, is a directory and is readable,
/// that the replica either is a directory or can be created as one,
/// and that neither root is an ancestor of the other. The replica
/// directory is created when missing. All failures are `Config`
/// errors.
pub async fn validate_paths<P: AsRef<Path>>(source: P, replica: P) -> Result<ValidatedPaths> {
    let source = source.as_ref();
    let replica = replica.as_ref();

    let canonical_source = fs::canonicalize(source).await.map_err(|e| {
        Error::config(format!(
            "Source path '{}' is invalid: {}",
            source.display(),
            e
        ))
    })?;

    let source_meta = fs::metadata(&canonical_source).await.map_err(|e| {
        Error::config(format!(
            "Source path '{}' is not accessible: {}",
            source.display(),
            e
        ))
    })?;
    if !source_meta.is_dir() {
        return Err(Error::config(format!(
            "Source path '{}' is not a directory",
            source.display()
        )));
    }

    // A directory that cannot be listed cannot be mirrored
    fs::read_dir(&canonical_source).await.map_err(|e| {
        Error::config(format!(
            "Source directory '{}' is not readable: {}",
            source.display(),
            e
        ))
    })?;

    // Refuse to create a missing replica inside the source; the
    // source must never be mutated, not even by validation
    let resolved_replica = resolve_destination(replica).await?;
    if resolved_replica.starts_with(&canonical_source)
        || canonical_source.starts_with(&resolved_replica)
    {
        return Err(Error::config(format!(
            "Source '{}' and replica '{}' paths must not overlap",
            source.display(),
            replica.display()
        )));
    }

    match fs::metadata(replica).await {
        Ok(meta) if !meta.is_dir() => {
            return Err(Error::config(format!(
                "Replica path '{}' exists but is not a directory",
                replica.display()
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(replica).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create replica directory '{}': {}",
                    replica.display(),
                    e
                ))
            })?;
            debug!("Created replica directory '{}'", replica.display());
        }
        Err(e) => {
            return Err(Error::config(format!(
                "Replica path '{}' is not accessible: {}",
                replica.display(),
                e
            )));
        }
    }

    let canonical_replica = fs::canonicalize(replica).await.map_err(|e| {
        Error::config(format!(
            "Replica path '{}' is invalid: {}",
            replica.display(),
            e
        ))
    })?;

    if canonical_replica.starts_with(&canonical_source)
        || canonical_source.starts_with(&canonical_replica)
    {
        return Err(Error::config(format!(
            "Source '{}' and replica '{}' paths must not overlap",
            source.display(),
            replica.display()
        )));
    }

    Ok(ValidatedPaths {
        source: canonical_source,
        replica: canonical_replica,
    })
}

/// Resolve where a possibly missing path would land on disk
///
/// Canonicalizes the deepest existing ancestor, then appends the
/// remaining components with `.` and `..` folded lexically. The
/// remaining components do not exist yet, so they cannot hide
/// symlinks.
async fn resolve_destination(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::config(format!("Cannot resolve working directory: {}", e)))?
            .join(path)
    };

    for ancestor in absolute.ancestors() {
        if let Ok(canonical) = fs::canonicalize(ancestor).await {
            let remainder = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return Ok(fold_components(&canonical.join(remainder)));
        }
    }

    Ok(fold_components(&absolute))
}

/// Fold `.` and `..` components without touching the filesystem
fn fold_components(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other.as_os_str()),
        }
    }
    folded
}
