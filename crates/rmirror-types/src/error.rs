//! Error types and handling for rmirror
//!
//! Validation and logging-setup failures are fatal and reported before
//! any cycle runs; per-entry I/O failures are recoverable and retried
//! naturally by the next cycle.

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Medium severity - operation should be retried
    Medium,
    /// High severity - operation should be aborted
    High,
}

/// Main error type for rmirror operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Path validation failed (missing source, overlapping roots, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Log sink setup failed
    #[error("Logging setup error: {message}")]
    Logging {
        /// Error message describing the logging setup issue
        message: String,
    },

    /// Cycle-level synchronization failure
    #[error("Synchronization error: {message}")]
    Sync {
        /// Error message describing the synchronization issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Logging setup errors
    Logging,
    /// Synchronization errors
    Sync,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Logging { .. } => ErrorKind::Logging,
            Self::Sync { .. } => ErrorKind::Sync,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } | Self::Sync { .. } => ErrorSeverity::Medium,
            Self::Config { .. } | Self::Logging { .. } => ErrorSeverity::High,
        }
    }

    /// Check if this error is recoverable by retrying on a later cycle
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { .. } | Self::Sync { .. } => true,
            Self::Config { .. } | Self::Logging { .. } => false,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new logging setup error
    pub fn logging<S: Into<String>>(message: S) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Create a new sync error
    pub fn sync<S: Into<String>>(message: S) -> Self {
        Self::Sync {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
