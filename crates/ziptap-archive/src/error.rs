use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source item '{name}' not found")]
    NotFound { name: String },

    #[error("duplicate entry name '{name}'")]
    DuplicateEntry { name: String },

    #[error("failed to read source item '{name}': {source}")]
    Read { name: String, source: io::Error },

    #[error("failed to write entry '{name}': {source}")]
    Write { name: String, source: io::Error },

    #[error("failed to close archive sink: {source}")]
    Close { source: io::Error },

    #[error("zip framing failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive production interrupted")]
    Interrupted,

    #[error("archive is truncated or corrupted: {source}")]
    Incomplete { source: zip::result::ZipError },
}

impl Error {
    /// True when the sink's consumer went away underneath the writer.
    pub fn is_disconnect(&self) -> bool {
        let io = match self {
            Self::Write { source, .. } => source,
            Self::Close { source } => source,
            Self::Zip(zip::result::ZipError::Io(source)) => source,
            _ => return false,
        };
        matches!(
            io.kind(),
            io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
