use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use ziptap_archive::{Compression, DirectoryProvider, SourceItem, SourceItemProvider, read_archive};
use ziptap_deliver::{DeliveryError, DeliveryOptions, Deliverer, Job, Scheduler};

fn junk_dir() -> tempfile::TempDir {
    let dir = tempfile::Builder::new()
        .prefix("ziptap-deliver-junk-")
        .tempdir()
        .expect("Failed to create temp dir");
    for (name, body) in [("junk1.txt", "AAA"), ("junk2.txt", "BB"), ("junk3.txt", "C")] {
        std::fs::write(dir.path().join(name), body).expect("Failed to write junk file");
    }
    dir
}

fn entries_of(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    read_archive(Cursor::new(bytes))
        .unwrap()
        .into_iter()
        .map(|e| (e.name, e.content))
        .collect()
}

struct CountingReader<R> {
    inner: R,
    consumed: Arc<AtomicUsize>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }
}

fn counted(name: &str, payload: Vec<u8>) -> (SourceItem, Arc<AtomicUsize>) {
    let consumed = Arc::new(AtomicUsize::new(0));
    let reader = CountingReader {
        inner: Cursor::new(payload),
        consumed: Arc::clone(&consumed),
    };
    (SourceItem::from_reader(name, reader), consumed)
}

struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.served {
            self.served = true;
            buf[0] = b'B';
            return Ok(1);
        }
        Err(io::Error::other("disk vanished"))
    }
}

fn failing_junk() -> Vec<SourceItem> {
    vec![
        SourceItem::from_bytes("junk1.txt", "AAA"),
        SourceItem::from_reader("junk2.txt", FailingReader { served: false }),
        SourceItem::from_bytes("junk3.txt", "C"),
    ]
}

/// Runs each job on its own OS thread and reports when it returns.
struct ThreadScheduler {
    finished: mpsc::UnboundedSender<()>,
}

impl Scheduler for ThreadScheduler {
    fn spawn(&self, job: Job) {
        let finished = self.finished.clone();
        std::thread::spawn(move || {
            job();
            let _ = finished.send(());
        });
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn all_strategies_produce_the_junk_entries() {
    let source = junk_dir();
    let scratch = tempfile::tempdir().unwrap();
    let provider = DirectoryProvider::junk(source.path());
    let deliverer = Deliverer::new(DeliveryOptions::default().temp_dir(scratch.path()), Handle::current());

    let archive = deliverer.tmp_file(provider.list().unwrap()).unwrap().into_file().unwrap();
    let tmp_bytes = std::fs::read(archive.path()).unwrap();

    let mut piped_bytes = Vec::new();
    let mut reader = deliverer.piped(provider.list().unwrap()).into_pipe().unwrap();
    reader.read_to_end(&mut piped_bytes).await.unwrap();

    let mut streamed_bytes = Vec::new();
    deliverer.streaming(provider.list().unwrap(), &mut streamed_bytes).unwrap();

    let mut direct_bytes = Vec::new();
    let mut direct = deliverer.direct_stream(provider.list().unwrap());
    while let Some(chunk) = direct.next().await {
        direct_bytes.extend_from_slice(&chunk.unwrap());
    }

    let expected = vec![
        ("junk1.txt".to_string(), b"AAA".to_vec()),
        ("junk2.txt".to_string(), b"BB".to_vec()),
        ("junk3.txt".to_string(), b"C".to_vec()),
    ];
    for bytes in [tmp_bytes, piped_bytes, streamed_bytes, direct_bytes] {
        assert_eq!(entries_of(bytes), expected);
    }
}

#[tokio::test]
async fn repeated_tmp_file_invocations_match() {
    let source = junk_dir();
    let scratch = tempfile::tempdir().unwrap();
    let provider = DirectoryProvider::junk(source.path());
    let deliverer = Deliverer::new(DeliveryOptions::default().temp_dir(scratch.path()), Handle::current());

    let first = deliverer.tmp_file(provider.list().unwrap()).unwrap().into_file().unwrap();
    let second = deliverer.tmp_file(provider.list().unwrap()).unwrap().into_file().unwrap();
    assert_ne!(first.path(), second.path());
    assert_eq!(
        entries_of(std::fs::read(first.path()).unwrap()),
        entries_of(std::fs::read(second.path()).unwrap())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeated_piped_invocations_match() {
    let source = junk_dir();
    let provider = DirectoryProvider::junk(source.path());
    let deliverer = Deliverer::new(DeliveryOptions::default(), Handle::current());

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut reader = deliverer.piped(provider.list().unwrap()).into_pipe().unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        runs.push(entries_of(out));
    }
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].len(), 3);
}

#[tokio::test]
async fn repeated_direct_streams_match() {
    let source = junk_dir();
    let provider = DirectoryProvider::junk(source.path());
    let deliverer = Deliverer::new(DeliveryOptions::default(), Handle::current());

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut direct = deliverer.direct_stream(provider.list().unwrap());
        let mut out = Vec::new();
        while let Some(chunk) = direct.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        runs.push(entries_of(out));
    }
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pipe_bounds_in_flight_bytes() {
    const SOURCE_LEN: usize = 1024 * 1024;
    let payload: Vec<u8> = (0..SOURCE_LEN).map(|i| (i % 251) as u8).collect();
    let (item, consumed) = counted("large.bin", payload.clone());

    let options = DeliveryOptions::default()
        .pipe_capacity(4 * 1024)
        .chunk_size(1024)
        .compression(Compression::Stored);
    let deliverer = Deliverer::new(options, Handle::current());
    let mut reader = deliverer.piped(vec![item]).into_pipe().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let stalled = consumed.load(Ordering::SeqCst);
    assert!(stalled > 0);
    assert!(stalled < 64 * 1024, "producer ran ahead: {stalled} bytes consumed");

    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    assert_eq!(consumed.load(Ordering::SeqCst), SOURCE_LEN);
    assert_eq!(entries_of(out), vec![("large.bin".to_string(), payload)]);
}

#[tokio::test]
async fn read_failure_surfaces_per_strategy() {
    let scratch = tempfile::tempdir().unwrap();
    let deliverer = Deliverer::new(DeliveryOptions::default().temp_dir(scratch.path()), Handle::current());

    let err = deliverer.tmp_file(failing_junk()).unwrap_err();
    assert!(matches!(err, DeliveryError::ArchiveWrite(_)));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);

    let err = deliverer.streaming(failing_junk(), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, DeliveryError::ArchiveWrite(_)));

    let mut direct = deliverer.direct_stream(failing_junk());
    let mut last = None;
    while let Some(chunk) = direct.next().await {
        last = Some(chunk);
    }
    assert!(matches!(last, Some(Err(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn piped_failure_truncates_and_errors() {
    let deliverer = Deliverer::new(DeliveryOptions::default(), Handle::current());
    let mut reader = deliverer.piped(failing_junk()).into_pipe().unwrap();

    let mut received = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), reader.read_to_end(&mut received))
        .await
        .expect("piped consumer hung");
    assert!(read.is_err());
    assert!(!received.is_empty());
    assert!(read_archive(Cursor::new(received)).is_err());
    assert!(reader.final_report().unwrap().outcome.is_failure());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_reader_stops_producer() {
    let (item, consumed) = counted("large.bin", vec![0x5a; 4 * 1024 * 1024]);
    let (finished, mut done) = mpsc::unbounded_channel();

    let options = DeliveryOptions::default()
        .pipe_capacity(4 * 1024)
        .compression(Compression::Stored);
    let deliverer =
        Deliverer::new(options, Handle::current()).with_scheduler(Arc::new(ThreadScheduler { finished }));
    let mut reader = deliverer.piped(vec![item]).into_pipe().unwrap();

    let mut head = [0u8; 512];
    reader.read_exact(&mut head).await.unwrap();
    assert_eq!(&head[..2], b"PK");
    drop(reader);

    tokio::time::timeout(Duration::from_secs(5), done.recv())
        .await
        .expect("producer did not stop");
    assert!(consumed.load(Ordering::SeqCst) < 4 * 1024 * 1024);
}

#[tokio::test]
async fn direct_stream_emits_before_last_item_is_read() {
    let (first, _) = counted("junk1.txt", b"AAA".to_vec());
    let (last, last_consumed) = counted("junk3.txt", b"C".to_vec());

    let deliverer = Deliverer::new(DeliveryOptions::default(), Handle::current());
    let mut direct = deliverer.direct_stream(vec![first, last]);

    let chunk = direct.next().await.unwrap().unwrap();
    assert!(chunk.starts_with(b"PK"));
    assert_eq!(last_consumed.load(Ordering::SeqCst), 0);

    while let Some(chunk) = direct.next().await {
        chunk.unwrap();
    }
    assert_eq!(last_consumed.load(Ordering::SeqCst), 1);
}
