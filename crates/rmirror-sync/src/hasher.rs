//! Streaming content digests for change detection

use rmirror_types::{Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::debug;

/// Default chunk size for streaming reads
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Computes content digests by streaming file bytes in bounded chunks
///
/// Two files with identical bytes always yield identical digests.
/// Digests are computed on demand and never cached; a changed file is
/// re-read in full on the next comparison.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    /// Create a hasher with the default chunk size
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create a hasher with a custom chunk size
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Compute the hex digest of a file's full byte content
    ///
    /// The file is read through a bounded buffer, never loaded into
    /// memory wholesale. I/O errors (unreadable file, file removed
    /// mid-read) propagate to the caller.
    pub async fn digest_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| Error::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let mut reader = BufReader::new(file);
        let mut hasher = blake3::Hasher::new();
        let mut chunk = vec![0u8; self.chunk_size];
        let mut total = 0u64;

        loop {
            let bytes_read = reader.read(&mut chunk).await.map_err(|e| Error::Io {
                message: format!("Failed to read file '{}': {}", path.display(), e),
            })?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&chunk[..bytes_read]);
            total += bytes_read as u64;
        }

        debug!("Hashed {} bytes from '{}'", total, path.display());
        Ok(hasher.finalize().to_hex().to_string())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
