//! Error types for ziptap-deliver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("source item '{name}' not found")]
    NotFound { name: String },

    #[error("temporary storage failed: {0}")]
    Storage(#[source] ziptap_fs::Error),

    #[error("archive write failed: {0}")]
    ArchiveWrite(#[source] ziptap_archive::Error),

    #[error("archive consumer went away")]
    PipeCancelled,
}

impl From<ziptap_archive::Error> for DeliveryError {
    fn from(e: ziptap_archive::Error) -> Self {
        match e {
            ziptap_archive::Error::NotFound { name } => Self::NotFound { name },
            ziptap_archive::Error::Interrupted => Self::PipeCancelled,
            e if e.is_disconnect() => Self::PipeCancelled,
            e => Self::ArchiveWrite(e),
        }
    }
}

impl From<ziptap_fs::Error> for DeliveryError {
    fn from(e: ziptap_fs::Error) -> Self { Self::Storage(e) }
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
