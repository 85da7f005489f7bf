//! Sequential ZIP production from a fixed list of source items.
//!
//! # Architecture
//!
//! - `source.rs` - Source items and providers
//! - `writer.rs` - Entry framing, one item after another
//! - `sink.rs` - Write-only destination with an explicit lifecycle
//! - `inspect.rs` - Reading a produced archive back
//! - `options.rs` - Compression and chunking configuration

pub use entry::{ArchiveReport, EntryRecord};
pub use error::{Error, Result};
pub use inspect::{InspectedEntry, read_archive};
pub use options::{Compression, DEFAULT_CHUNK_SIZE, WriteOptions};
pub use sink::{Sink, SinkState};
pub use source::{DEFAULT_ITEM_NAMES, DirectoryProvider, ItemContent, SourceItem, SourceItemProvider, StaticProvider};
pub use writer::{ArchiveStream, ArchiveWriter, Step};

pub mod entry;
mod error;
mod inspect;
pub mod options;
mod sink;
pub mod source;
mod writer;
