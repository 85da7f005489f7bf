//! Owned temporary archive files with exactly-once cleanup.

mod error;
mod temp;

pub use error::{Error, Result};
pub use temp::{TempArchive, TempArchiveOptions};
