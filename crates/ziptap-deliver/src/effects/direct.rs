use std::io::{self, Write};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::Stream;
use tracing::debug;
use ziptap_archive::{ArchiveStream, ArchiveWriter, SourceItem, Step, WriteOptions};

use crate::core::DurationTracker;
use crate::data::{Outcome, StrategyKind, StrategyReport};
use crate::error::DeliveryError;

/// Response-side buffer the archive stream writes into between polls.
#[derive(Clone, Debug, Default)]
struct ResponseSink {
    buffer: Arc<Mutex<BytesMut>>,
}

impl ResponseSink {
    fn lock(&self) -> MutexGuard<'_, BytesMut> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self) -> Bytes {
        self.lock().split().freeze()
    }
}

impl Write for ResponseSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Archive bytes produced on demand, one step per poll.
///
/// No task is spawned: each poll advances production by one step, reading
/// at most one chunk of the current item on the polling thread. A step that
/// produced no output wakes the task and returns `Pending`. An error is the
/// final item.
pub struct DirectStream {
    stream: Option<ArchiveStream<ResponseSink>>,
    sink: ResponseSink,
    tracker: Option<DurationTracker>,
    report: Option<StrategyReport>,
}

impl DirectStream {
    pub(crate) fn new(items: Vec<SourceItem>, options: WriteOptions) -> Self {
        let sink = ResponseSink::default();
        let stream = ArchiveWriter::new(options).stream(items, sink.clone());
        Self {
            stream: Some(stream),
            sink,
            tracker: Some(DurationTracker::start(StrategyKind::Streaming)),
            report: None,
        }
    }

    /// Set once the stream has ended, successfully or not.
    pub fn report(&self) -> Option<&StrategyReport> {
        self.report.as_ref()
    }

    fn finish(&mut self, outcome: Outcome) {
        let archive = self.stream.take().map(ArchiveStream::into_report);
        if let Some(tracker) = self.tracker.take() {
            let archive = archive.filter(|_| !outcome.is_failure());
            self.report = Some(tracker.finish(outcome, archive.as_ref()));
        }
    }
}

impl Stream for DirectStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(stream) = this.stream.as_mut() else {
            return Poll::Ready(None);
        };

        match stream.step() {
            Ok(Step::Done) => {
                this.finish(Outcome::Success);
                Poll::Ready(None)
            }
            Ok(_) => {
                let bytes = this.sink.take();
                if bytes.is_empty() {
                    // The compressor held the chunk back; yield before reading the next one.
                    cx.waker().wake_by_ref();
                    return Poll::Pending;
                }
                Poll::Ready(Some(Ok(bytes)))
            }
            Err(e) => {
                let err = DeliveryError::from(e);
                this.finish(Outcome::Failure(err.to_string()));
                Poll::Ready(Some(Err(io::Error::other(err))))
            }
        }
    }
}

impl Drop for DirectStream {
    fn drop(&mut self) {
        if self.tracker.is_some() {
            debug!("streaming response dropped before the archive finished");
            self.finish(Outcome::Failure("response dropped".into()));
        }
    }
}
