//! One-way tree mirroring engine for rmirror
//!
//! This crate implements the core of a source-to-replica mirror:
//!
//! - **Content Hashing**: streaming digest of file contents to detect
//!   changes without trusting size or timestamps
//! - **Tree Synchronization**: walk the source tree and create or
//!   overwrite replica entries until every source file has a
//!   byte-identical counterpart
//! - **Tree Pruning**: walk the replica tree and remove every entry
//!   that no longer exists in the source
//! - **Path Validation**: verify the source/replica pair before the
//!   first cycle and reject overlapping roots
//!
//! The source tree is never mutated. No state persists between
//! cycles; each cycle rediscovers everything from the filesystem, so
//! repeated cycles are idempotent once the trees agree.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rmirror_sync::{validate_paths, TreePruner, TreeSynchronizer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = validate_paths("source_dir", "replica_dir").await?;
//! let report = TreeSynchronizer::new()
//!     .synchronize(paths.source(), paths.replica())
//!     .await?;
//! println!("copied {} files", report.stats.files_copied);
//! let report = TreePruner::new()
//!     .prune(paths.source(), paths.replica())
//!     .await?;
//! println!("removed {} files", report.stats.files_removed);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod hasher;
pub mod prune;
pub mod report;
pub mod sync;
pub mod validate;

pub use hasher::ContentHasher;
pub use prune::TreePruner;
pub use report::{CycleReport, EntryFailure, EntryOperation};
pub use sync::{MirrorOptions, TreeSynchronizer};
pub use validate::{validate_paths, ValidatedPaths};
