use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use tokio::io::DuplexStream;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::io::SyncIoBridge;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use ziptap_archive::{ArchiveReport, ArchiveWriter, Sink, SourceItem, WriteOptions};
use ziptap_fs::TempArchive;

use crate::core::DurationTracker;
use crate::data::{DeliveryOptions, Outcome, StrategyKind, StrategyReport};
use crate::effects::direct::DirectStream;
use crate::effects::pipe::PipeReader;
use crate::effects::scheduler::{Scheduler, TokioScheduler};
use crate::error::{DeliveryError, Result};

/// Where the archive bytes of a finished strategy call live.
#[derive(Debug)]
pub enum ByteSource {
    /// Completed archive on disk, deleted when the handle is dropped.
    File(TempArchive),
    /// Live read end of the bounded pipe.
    Pipe(PipeReader),
    /// Bytes already went to the caller's destination.
    Written,
}

/// Result of one strategy invocation.
#[derive(Debug)]
pub struct StrategyResult {
    pub source: ByteSource,
    pub report: StrategyReport,
}

impl StrategyResult {
    pub fn into_file(self) -> Option<TempArchive> {
        match self.source {
            ByteSource::File(archive) => Some(archive),
            _ => None,
        }
    }

    pub fn into_pipe(self) -> Option<PipeReader> {
        match self.source {
            ByteSource::Pipe(reader) => Some(reader),
            _ => None,
        }
    }
}

/// Runs the delivery strategies.
///
/// Holds the runtime handle the pipe bridge blocks on and the scheduler that
/// runs piped producers.
pub struct Deliverer {
    options: DeliveryOptions,
    scheduler: Arc<dyn Scheduler>,
    handle: Handle,
}

impl fmt::Debug for Deliverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deliverer")
            .field("options", &self.options)
            .field("scheduler", &"{ ... }")
            .finish()
    }
}

impl Deliverer {
    /// Uses `handle`'s blocking pool for piped producers.
    pub fn new(options: DeliveryOptions, handle: Handle) -> Self {
        Self {
            options,
            scheduler: Arc::new(TokioScheduler::new(handle.clone())),
            handle,
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Writes the whole archive to a temporary file and returns the file.
    ///
    /// Blocks for the entire production. On error the partial file is
    /// deleted before returning.
    pub fn tmp_file(&self, items: Vec<SourceItem>) -> Result<StrategyResult> {
        let tracker = DurationTracker::start(StrategyKind::TmpFile);
        match self.write_tmp_file(items) {
            Ok((archive, report)) => Ok(StrategyResult {
                source: ByteSource::File(archive),
                report: tracker.finish(Outcome::Success, Some(&report)),
            }),
            Err(e) => {
                tracker.finish(Outcome::Failure(e.to_string()), None);
                Err(e)
            }
        }
    }

    fn write_tmp_file(&self, items: Vec<SourceItem>) -> Result<(TempArchive, ArchiveReport)> {
        let (archive, file) = TempArchive::create(&self.options.temp_options())?;
        debug!(path = %archive.path().display(), "writing archive to temporary file");

        let mut sink = Sink::new(BufWriter::new(file));
        let report = ArchiveWriter::new(self.options.write_options()).write(items, &mut sink)?;

        let storage = |source: std::io::Error| {
            DeliveryError::Storage(ziptap_fs::Error::Write {
                path: archive.path().to_path_buf(),
                source,
            })
        };
        sink.close().map_err(storage)?;
        let file: File = sink.into_inner().into_inner().map_err(|e| storage(e.into_error()))?;
        file.sync_all().map_err(storage)?;

        Ok((archive, report))
    }

    /// Starts production on a background job and returns the pipe's read
    /// end immediately.
    ///
    /// The returned report only covers the handoff; the producer's report
    /// arrives through [`PipeReader::final_report`].
    pub fn piped(&self, items: Vec<SourceItem>) -> StrategyResult {
        let tracker = DurationTracker::start(StrategyKind::Piped);
        let (reader, writer) = tokio::io::duplex(self.options.pipe_capacity);
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let options = self
            .options
            .write_options()
            .interrupt(Arc::new(move || token.is_cancelled()));
        let handle = self.handle.clone();

        self.scheduler.spawn(Box::new(move || {
            let report = produce_into_pipe(items, writer, handle, options);
            // A dropped reader has nobody to tell.
            let _ = tx.send(report);
        }));

        StrategyResult {
            source: ByteSource::Pipe(PipeReader::new(reader, rx, cancel)),
            report: tracker.finish(Outcome::HandedOff, None),
        }
    }

    /// Writes the archive straight into `destination` on the calling thread.
    pub fn streaming<W: Write>(&self, items: Vec<SourceItem>, destination: &mut W) -> Result<StrategyResult> {
        let tracker = DurationTracker::start(StrategyKind::Streaming);
        let mut sink = Sink::new(destination);
        let result = write_and_close(self.options.write_options(), items, &mut sink).map_err(DeliveryError::from);

        match result {
            Ok(report) => Ok(StrategyResult {
                source: ByteSource::Written,
                report: tracker.finish(Outcome::Success, Some(&report)),
            }),
            Err(e) => {
                tracker.finish(Outcome::Failure(e.to_string()), None);
                Err(e)
            }
        }
    }

    /// Pull-driven form of [`streaming`](Self::streaming) for response bodies.
    pub fn direct_stream(&self, items: Vec<SourceItem>) -> DirectStream {
        DirectStream::new(items, self.options.write_options())
    }
}

fn write_and_close<W: Write>(
    options: WriteOptions,
    items: Vec<SourceItem>,
    sink: &mut Sink<W>,
) -> ziptap_archive::Result<ArchiveReport> {
    let report = ArchiveWriter::new(options).write(items, sink)?;
    sink.close().map_err(|source| ziptap_archive::Error::Close { source })?;
    Ok(report)
}

/// Body of the piped background job. The write end is shut down and dropped
/// on every path before the report is returned.
fn produce_into_pipe(
    items: Vec<SourceItem>,
    writer: DuplexStream,
    handle: Handle,
    options: WriteOptions,
) -> StrategyReport {
    let tracker = DurationTracker::start(StrategyKind::Piped);
    let mut sink = Sink::new(SyncIoBridge::new_with_handle(writer, handle));
    let result = write_and_close(options, items, &mut sink).map_err(DeliveryError::from);

    let mut bridge = sink.into_inner();
    if let Err(e) = bridge.shutdown() {
        debug!(error = %e, "pipe shutdown failed");
    }
    drop(bridge);

    match result {
        Ok(report) => tracker.finish(Outcome::Success, Some(&report)),
        Err(DeliveryError::PipeCancelled) => {
            debug!("pipe reader went away, archive production stopped");
            tracker.finish(Outcome::Failure(DeliveryError::PipeCancelled.to_string()), None)
        }
        Err(e) => {
            error!(error = %e, "piped archive production failed");
            tracker.finish(Outcome::Failure(e.to_string()), None)
        }
    }
}
