//! Filesystem-backed data source

use async_trait::async_trait;
use pkgrelay_types::{DataSource, SourceStream};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Data source reading from a local file.
///
/// The stream length is the file length at open time; installs assume the
/// file is not mutated while the batch runs.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    /// Create a source for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn open(&self) -> Option<Box<dyn SourceStream>> {
        let file = File::open(&self.path).await.ok()?;
        let len = file.metadata().await.ok()?.len();
        Some(Box::new(FileStream { file, len }))
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

struct FileStream {
    file: File,
    len: u64,
}

impl AsyncRead for FileStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl SourceStream for FileStream {
    fn len(&self) -> u64 {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn opens_file_with_length() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"payload-bytes").unwrap();

        let source = FileDataSource::new(tmp.path());
        let mut stream = source.open().await.unwrap();
        assert_eq!(stream.len(), 13);

        let mut contents = Vec::new();
        stream.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"payload-bytes");
    }

    #[tokio::test]
    async fn missing_file_yields_none() {
        let source = FileDataSource::new("/nonexistent/definitely/missing.apk");
        assert!(source.open().await.is_none());
        assert!(source.source_path().is_some());
    }
}
