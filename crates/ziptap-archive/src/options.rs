use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default transfer chunk, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Per-entry compression method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }

    pub(crate) fn from_method(method: zip::CompressionMethod) -> Option<Self> {
        match method {
            zip::CompressionMethod::Stored => Some(Self::Stored),
            zip::CompressionMethod::Deflated => Some(Self::Deflated),
            _ => None,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Deflated => write!(f, "deflated"),
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stored" | "store" => Ok(Self::Stored),
            "deflated" | "deflate" => Ok(Self::Deflated),
            other => Err(format!("unknown compression '{other}' (expected stored or deflated)")),
        }
    }
}

/// Configuration for archive production.
#[derive(Clone)]
pub struct WriteOptions {
    pub compression: Compression,

    /// Bytes moved from an item into the archive per step.
    ///
    /// Default: 8 KiB
    pub chunk_size: usize,

    /// Checked before every step; returning `true` stops the writer with
    /// [`Error::Interrupted`](crate::Error::Interrupted).
    ///
    /// Default: None
    pub interrupt: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("compression", &self.compression)
            .field("chunk_size", &self.chunk_size)
            .field("interrupt", &self.interrupt.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            interrupt: None,
        }
    }
}

impl WriteOptions {
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Zero is bumped to one byte.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn interrupt(mut self, check: Arc<dyn Fn() -> bool + Send + Sync>) -> Self {
        self.interrupt = Some(check);
        self
    }

    pub(crate) fn interrupted(&self) -> bool {
        self.interrupt.as_ref().is_some_and(|check| check())
    }
}
