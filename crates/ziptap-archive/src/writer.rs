//! Sequential ZIP production.
//!
//! Entries are streamed: each local header is followed by the payload and a
//! trailing data descriptor, and the central directory is written last. The
//! sink never needs to seek, so files, pipes and response bodies all work.

use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use zip::ZipWriter;
use zip::write::{SimpleFileOptions, StreamWriter};

use crate::entry::{ArchiveReport, EntryRecord};
use crate::error::{Error, Result};
use crate::options::WriteOptions;
use crate::source::SourceItem;

/// Outcome of one [`ArchiveStream::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Local header of the next entry was written.
    EntryStarted,
    /// Payload bytes moved from the current item into the archive.
    Transferred(usize),
    /// Current item is exhausted; its record is in the report.
    EntryFinished,
    /// Central directory written. Returned once.
    Finished,
    Done,
}

/// Serializes source items into a ZIP archive.
#[derive(Clone, Debug, Default)]
pub struct ArchiveWriter {
    options: WriteOptions,
}

impl ArchiveWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Writes every item into `sink` and finishes the archive.
    ///
    /// On error the sink holds a partial archive without a central directory;
    /// closing or discarding it is up to the caller.
    pub fn write<W: Write>(&self, items: Vec<SourceItem>, sink: &mut W) -> Result<ArchiveReport> {
        let mut stream = self.stream(items, sink);
        while stream.step()? != Step::Done {}
        Ok(stream.into_report())
    }

    /// Same production as [`write`](Self::write), driven one step at a time.
    pub fn stream<S: Write>(&self, items: Vec<SourceItem>, sink: S) -> ArchiveStream<S> {
        ArchiveStream::new(items, sink, self.options.clone())
    }
}

struct OpenEntry {
    name: String,
    reader: Box<dyn Read + Send>,
    size: u64,
    crc: crc32fast::Hasher,
}

/// Incremental archive production over an owned sink.
pub struct ArchiveStream<S: Write> {
    zip: Option<ZipWriter<StreamWriter<Abortable<S>>>>,
    aborted: Arc<AtomicBool>,
    items: std::vec::IntoIter<SourceItem>,
    current: Option<OpenEntry>,
    seen: HashSet<String>,
    buffer: Vec<u8>,
    file_options: SimpleFileOptions,
    options: WriteOptions,
    report: ArchiveReport,
}

impl<S: Write> ArchiveStream<S> {
    fn new(items: Vec<SourceItem>, sink: S, options: WriteOptions) -> Self {
        let aborted = Arc::new(AtomicBool::new(false));
        let sink = Abortable {
            inner: sink,
            aborted: Arc::clone(&aborted),
        };
        let file_options = SimpleFileOptions::default()
            .compression_method(options.compression.method())
            .unix_permissions(0o644);

        Self {
            zip: Some(ZipWriter::new_stream(sink)),
            aborted,
            items: items.into_iter(),
            current: None,
            seen: HashSet::new(),
            buffer: vec![0; options.chunk_size.max(1)],
            file_options,
            options,
            report: ArchiveReport::default(),
        }
    }

    /// Advances production by one step.
    ///
    /// After an error the stream is dead: further calls return `Done` and the
    /// archive is never finalized.
    pub fn step(&mut self) -> Result<Step> {
        let result = self.advance();
        if result.is_err() {
            self.abort();
        }
        result
    }

    pub fn is_done(&self) -> bool {
        self.zip.is_none()
    }

    pub fn report(&self) -> &ArchiveReport {
        &self.report
    }

    pub fn into_report(mut self) -> ArchiveReport {
        std::mem::take(&mut self.report)
    }

    fn advance(&mut self) -> Result<Step> {
        let Some(zip) = self.zip.as_mut() else {
            return Ok(Step::Done);
        };
        if self.options.interrupted() {
            return Err(Error::Interrupted);
        }

        if let Some(entry) = self.current.as_mut() {
            let n = match entry.reader.read(&mut self.buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Step::Transferred(0)),
                Err(source) => {
                    return Err(Error::Read {
                        name: entry.name.clone(),
                        source,
                    });
                }
            };

            if n == 0 {
                if let Some(entry) = self.current.take() {
                    debug!(entry = %entry.name, size = entry.size, "entry finished");
                    self.report.push(EntryRecord {
                        name: entry.name,
                        size: entry.size,
                        crc32: entry.crc.finalize(),
                        compression: self.options.compression,
                    });
                }
                return Ok(Step::EntryFinished);
            }

            let chunk = &self.buffer[..n];
            zip.write_all(chunk).map_err(|source| Error::Write {
                name: entry.name.clone(),
                source,
            })?;
            entry.crc.update(chunk);
            entry.size += n as u64;
            return Ok(Step::Transferred(n));
        }

        match self.items.next() {
            Some(item) => {
                if !self.seen.insert(item.name.clone()) {
                    return Err(Error::DuplicateEntry { name: item.name });
                }
                debug!(entry = %item.name, "processing file");

                let name = item.name;
                let reader = item.content.open().map_err(|source| {
                    if source.kind() == io::ErrorKind::NotFound {
                        Error::NotFound { name: name.clone() }
                    } else {
                        Error::Read {
                            name: name.clone(),
                            source,
                        }
                    }
                })?;
                zip.start_file(name.as_str(), self.file_options)?;

                self.current = Some(OpenEntry {
                    name,
                    reader,
                    size: 0,
                    crc: crc32fast::Hasher::new(),
                });
                Ok(Step::EntryStarted)
            }
            None => {
                if let Some(zip) = self.zip.take() {
                    zip.finish()?;
                }
                Ok(Step::Finished)
            }
        }
    }

    /// Drops the writer without letting it append a central directory.
    fn abort(&mut self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.current = None;
        self.zip = None;
    }
}

impl<S: Write> Drop for ArchiveStream<S> {
    fn drop(&mut self) {
        if self.zip.is_some() {
            self.abort();
        }
    }
}

/// Swallows writes once production is abandoned, so the ZIP writer's own
/// drop can neither reach the sink with a central directory nor report a
/// failed finalize.
struct Abortable<S> {
    inner: S,
    aborted: Arc<AtomicBool>,
}

impl<S> Abortable<S> {
    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl<S: Write> Write for Abortable<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_aborted() {
            return Ok(buf.len());
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_aborted() {
            return Ok(());
        }
        self.inner.flush()
    }
}
