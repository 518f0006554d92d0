//! Periodic mirror cycle scheduling for rmirror
//!
//! This crate drives the synchronize-then-prune engine in a loop:
//! one full cycle, a fixed pause, the next cycle, until an explicit
//! stop request arrives through the scheduler handle. Cycles never
//! overlap; a cycle that overruns the interval simply delays the next
//! one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rmirror_engine::MirrorScheduler;
//! use rmirror_sync::validate_paths;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = validate_paths("source_dir", "replica_dir").await?;
//! let (scheduler, handle) = MirrorScheduler::new(paths, Duration::from_secs(60));
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_secs(600)).await;
//!     handle.stop().await;
//! });
//! scheduler.run().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod scheduler;

pub use scheduler::{MirrorScheduler, SchedulerHandle};
