//! Integration test suite for rmirror
//!
//! End-to-end scenarios exercising the full synchronize-then-prune
//! cycle live in `tests/`; this crate root only provides shared
//! fixtures and tree-comparison helpers.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Tree construction and comparison utilities
///
/// This module provides common helpers used across the integration
/// tests: building a directory tree from a declarative list and
/// snapshotting a tree into comparable (path, content) pairs.
pub mod test_utils;
