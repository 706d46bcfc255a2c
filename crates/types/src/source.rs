//! Byte-stream source contract for install items

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use tokio::io::AsyncRead;

/// Provider of the bytes behind one install item.
///
/// Implementations wrap whatever the caller hands us (a file, a content
/// stream, an in-memory blob). `open` returning `None` means the backing
/// stream cannot be produced at all, which aborts the item's group.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Open the backing stream. `None` signals the source is unavailable.
    async fn open(&self) -> Option<Box<dyn SourceStream>>;

    /// Filesystem origin of the bytes, when one exists.
    ///
    /// Used by the auto-delete hook; sources without a path are skipped.
    fn source_path(&self) -> Option<&Path> {
        None
    }
}

/// An opened, readable stream with a known total length.
///
/// The length is read up front because the install session's write slot
/// must be sized before any byte is copied.
pub trait SourceStream: AsyncRead + Send + Unpin {
    /// Total number of bytes this stream will yield.
    fn len(&self) -> u64;

    /// Whether the stream yields no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
