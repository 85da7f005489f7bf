use std::path::PathBuf;

use ziptap_archive::{Compression, DEFAULT_CHUNK_SIZE, WriteOptions};
use ziptap_fs::TempArchiveOptions;

/// Default bounded pipe size, in bytes.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Configuration shared by all delivery strategies.
#[derive(Clone, Debug)]
pub struct DeliveryOptions {
    /// Maximum archive bytes in flight between the piped producer and its
    /// reader.
    ///
    /// Default: 64 KiB
    pub pipe_capacity: usize,

    /// Default: 8 KiB
    pub chunk_size: usize,

    pub compression: Compression,

    /// Directory for temp-file archives. `None` uses the OS temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Default: "compressed"
    pub temp_prefix: String,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            compression: Compression::default(),
            temp_dir: None,
            temp_prefix: "compressed".into(),
        }
    }
}

impl DeliveryOptions {
    /// Zero is bumped to one byte.
    #[must_use]
    pub fn pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions::default()
            .compression(self.compression)
            .chunk_size(self.chunk_size)
    }

    pub fn temp_options(&self) -> TempArchiveOptions {
        let options = TempArchiveOptions::new().prefix(self.temp_prefix.clone());
        match &self.temp_dir {
            Some(dir) => options.dir(dir),
            None => options,
        }
    }
}
