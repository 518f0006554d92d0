//! Core type system and error handling for rmirror
//!
//! This crate provides the foundational types shared by the rmirror
//! workspace:
//!
//! - **Error handling**: structured error types with severity levels
//!   and recoverability classification
//! - **Core types**: per-cycle statistics for mirror operations
//!
//! # Examples
//!
//! ```rust
//! use rmirror_types::{CycleStats, Result};
//!
//! fn example_cycle() -> Result<CycleStats> {
//!     let mut stats = CycleStats::new();
//!     stats.files_copied = 10;
//!     stats.bytes_copied = 1024 * 1024; // 1MB
//!     Ok(stats)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use types::CycleStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_stats_creation() {
        let stats = CycleStats::new();
        assert_eq!(stats.files_copied, 0);
        assert_eq!(stats.bytes_copied, 0);
        assert!(stats.is_noop());
    }

    #[test]
    fn test_error_severity() {
        let io_error = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert_eq!(io_error.severity(), ErrorSeverity::Medium);

        let config_error = Error::config("paths overlap");
        assert_eq!(config_error.severity(), ErrorSeverity::High);
    }
}
