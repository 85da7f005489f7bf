//! Response bodies backed by strategy outputs.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures_util::Stream;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use ziptap_fs::TempArchive;

/// Streams a finished temporary archive and deletes it afterwards.
///
/// The file is removed when the stream reaches end of file or fails, and
/// again on drop, so a client that disconnects mid-download still leaves
/// nothing behind.
pub struct TempFileStream {
    inner: Option<ReaderStream<tokio::fs::File>>,
    archive: TempArchive,
}

impl TempFileStream {
    /// Opens `archive` for reading. Returns the stream and the file length.
    pub fn open(archive: TempArchive) -> ziptap_fs::Result<(Self, u64)> {
        let file = archive.open()?;
        let len = archive.len()?;
        let stream = Self {
            inner: Some(ReaderStream::new(tokio::fs::File::from_std(file))),
            archive,
        };
        Ok((stream, len))
    }

    fn release(&mut self) {
        self.inner = None;
        match self.archive.remove() {
            Ok(true) => debug!(path = %self.archive.path().display(), "temporary archive removed"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to remove temporary archive"),
        }
    }
}

impl Stream for TempFileStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(Pin::new(inner).poll_next(cx)) {
            Some(Ok(bytes)) => Poll::Ready(Some(Ok(bytes))),
            Some(Err(e)) => {
                this.release();
                Poll::Ready(Some(Err(e)))
            }
            None => {
                this.release();
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for TempFileStream {
    fn drop(&mut self) {
        if self.inner.is_some() {
            debug!("temporary archive body dropped before end of file");
        }
        self.release();
    }
}
