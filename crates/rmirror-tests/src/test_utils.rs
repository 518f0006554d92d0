//! Unified test utilities for the rmirror integration suite

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A source/replica fixture rooted in one temporary directory
#[derive(Debug)]
pub struct MirrorFixture {
    /// Keeps the temporary directory alive for the test's duration
    pub temp_dir: TempDir,
    /// Source root (authoritative)
    pub source: PathBuf,
    /// Replica root (mirrored)
    pub replica: PathBuf,
}

impl MirrorFixture {
    /// Create empty source and replica directories
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir(&source).expect("failed to create source dir");
        fs::create_dir(&replica).expect("failed to create replica dir");
        Self {
            temp_dir,
            source,
            replica,
        }
    }
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Populate a tree from (relative path, content) pairs
///
/// A trailing `/` in the relative path creates an empty directory;
/// parent directories are created as needed.
pub fn build_tree(root: &Path, entries: &[(&str, &[u8])]) {
    for (rel, content) in entries {
        let path = root.join(rel.trim_end_matches('/'));
        if rel.ends_with('/') {
            fs::create_dir_all(&path).expect("failed to create directory");
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("failed to create parent");
            }
            fs::write(&path, content).expect("failed to write file");
        }
    }
}

/// Snapshot a tree as relative path -> file content
///
/// Directories appear with `None` content so structural differences
/// (empty directories included) show up in comparisons.
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    let mut snapshot = BTreeMap::new();
    collect(root, root, &mut snapshot);
    snapshot
}

fn collect(root: &Path, dir: &Path, snapshot: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
    for entry in fs::read_dir(dir).expect("failed to read dir") {
        let entry = entry.expect("failed to read entry");
        let path = entry.path();
        let relative = path.strip_prefix(root).expect("entry outside root").to_path_buf();
        if path.is_dir() {
            snapshot.insert(relative, None);
            collect(root, &path, snapshot);
        } else {
            let content = fs::read(&path).expect("failed to read file");
            snapshot.insert(relative, Some(content));
        }
    }
}

/// Assert that two trees are structurally and byte-wise identical
pub fn assert_trees_identical(a: &Path, b: &Path) {
    assert_eq!(
        snapshot_tree(a),
        snapshot_tree(b),
        "trees '{}' and '{}' differ",
        a.display(),
        b.display()
    );
}
