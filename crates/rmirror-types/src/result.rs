//! Result type alias for rmirror operations

use crate::Error;

/// Result type alias for rmirror operations
pub type Result<T> = std::result::Result<T, Error>;
