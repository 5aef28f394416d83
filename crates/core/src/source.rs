//! Chunked data sources
//!
//! The upload engine consumes a forward-only, single-pass supplier of bytes:
//! a descriptor for log messages, an optional total byte count, successive
//! chunks on demand, and a `clear` that resets per-upload scratch state so
//! the next upload starts clean. [`FileSource`] is the standard local-file
//! implementation; anything mount-shaped can implement the trait.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Upper bound on a single read. Keeps upload memory flat regardless of
/// payload size.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// A forward-only supplier of upload bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkSource: Send {
    /// Human-readable descriptor of what is being read (a path, usually).
    fn description(&self) -> String;

    /// Total bytes this source will yield, when known up front.
    fn byte_count(&self) -> Option<u64>;

    /// Next chunk, `None` at end of input.
    async fn read_chunk(&mut self) -> io::Result<Option<Bytes>>;

    /// Reset per-upload scratch state. Called after every upload, successful
    /// or not.
    async fn clear(&mut self) -> io::Result<()>;
}

/// Local-file source reading bounded chunks.
pub struct FileSource {
    path: PathBuf,
    file: File,
    len: u64,
    chunk_size: usize,
}

impl FileSource {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::with_chunk_size(path, DEFAULT_CHUNK_SIZE).await
    }

    pub async fn with_chunk_size(path: impl AsRef<Path>, chunk_size: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok(Self {
            path,
            file,
            len,
            chunk_size: chunk_size.max(1),
        })
    }
}

#[async_trait]
impl ChunkSource for FileSource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn byte_count(&self) -> Option<u64> {
        Some(self.len)
    }

    async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        // A short read is not end-of-file; keep filling until the chunk is
        // full or the file runs out.
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }

    async fn clear(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0)).await?;
        Ok(())
    }
}
