use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct TempArchiveOptions {
    dir: Option<PathBuf>,
    prefix: String,
    suffix: String,
}

impl Default for TempArchiveOptions {
    fn default() -> Self { Self::new() }
}

impl TempArchiveOptions {
    pub fn new() -> Self {
        Self {
            dir: None,
            prefix: "compressed".into(),
            suffix: ".zip".into(),
        }
    }

    /// Directory to create files in. Defaults to the OS temp dir.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// A uniquely named file owned by one request.
///
/// The file is deleted exactly once: by the first successful [`remove`]
/// or, failing that, on drop. Removing a file that is already gone is not
/// an error.
///
/// [`remove`]: TempArchive::remove
#[derive(Debug)]
pub struct TempArchive {
    path: PathBuf,
    removed: AtomicBool,
}

impl TempArchive {
    /// Creates the file and returns it opened for writing.
    pub fn create(options: &TempArchiveOptions) -> Result<(Self, File)> {
        let dir = options.resolved_dir();
        let (file, path) = tempfile::Builder::new()
            .prefix(&options.prefix)
            .suffix(&options.suffix)
            .tempfile_in(&dir)
            .and_then(|named| named.keep().map_err(|e| e.error))
            .map_err(|source| Error::Create { dir, source })?;

        Ok((
            Self {
                path,
                removed: AtomicBool::new(false),
            },
            file,
        ))
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Opens the finished file for reading.
    pub fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })
    }

    pub fn len(&self) -> Result<u64> {
        std::fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|source| Error::Open {
                path: self.path.clone(),
                source,
            })
    }

    pub fn is_empty(&self) -> Result<bool> { self.len().map(|n| n == 0) }

    pub fn is_removed(&self) -> bool { self.removed.load(Ordering::SeqCst) }

    /// Deletes the file. Returns `true` only for the call that removed it.
    pub fn remove(&self) -> Result<bool> {
        if self.removed.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(source) => {
                self.removed.store(false, Ordering::SeqCst);
                Err(Error::Remove {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        let _ = self.remove();
    }
}
